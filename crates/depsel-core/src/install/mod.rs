//! Running a package manager for a set of packages and streaming its output.
//!
//! The pieces, leaf first:
//! - [`resolve`]: find the `npm`/`yarn`/`cnpm` executable.
//! - [`command`]: build its argument vector.
//! - [`supervisor`]: own the single live child process and split its output into lines.
//! - [`render`]: turn ANSI-coloured lines into inert markup.
//! - [`orchestrator`]: tie them together for one front-end.

pub mod command;
mod error;
pub mod manager;
pub mod orchestrator;
pub mod render;
pub mod resolve;
pub mod supervisor;
pub mod surface;

pub use command::{build_args, InstallCommand};
pub use error::{codes, InstallError};
pub use manager::{DependencyKind, InstallRequest, ManagerChoice};
pub use orchestrator::{InstallOutcome, Orchestrator, Phase, FAILURE_TAIL_LINES};
pub use render::{render_line, RenderedLine};
pub use resolve::{resolve_binary, Platform, SearchPath, FALLBACK_DIRS};
pub use supervisor::{
    InstallHandle, InstallId, LineBuffer, OutputStream, Supervisor, SupervisorEvent,
};
pub use surface::{DisplaySurface, MemoryNotifier, MemorySurface, Notifier};
