#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod imports;
pub mod install;
pub mod paths;
pub mod version;

pub use config::Config;
pub use error::Error;
pub use imports::{extract_dependencies, is_supported_source, scan_specifiers, Specifier};
pub use install::{
    DependencyKind, DisplaySurface, InstallError, InstallHandle, InstallOutcome, InstallRequest,
    ManagerChoice, Notifier, Orchestrator, RenderedLine, SearchPath,
};
pub use version::VERSION;
