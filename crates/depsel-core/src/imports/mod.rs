//! Dependency discovery in selected JavaScript source.
//!
//! `scan` finds raw module specifiers; `deps` reduces them to the package
//! names worth handing to a package manager.

mod deps;
mod scan;

pub use deps::{
    dedupe_names, extract_dependencies, is_bare_specifier, is_core_module, is_supported_source,
    package_name, select_lines, SUPPORTED_EXTENSIONS,
};
pub use scan::{scan_specifiers, ImportKind, Specifier};
