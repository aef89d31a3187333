//! Install orchestrator error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, used in JSON output and exit-code mapping.
pub mod codes {
    pub const INSTALL_EMPTY_REQUEST: &str = "INSTALL_EMPTY_REQUEST";
    pub const INSTALL_NO_PROJECT_ROOT: &str = "INSTALL_NO_PROJECT_ROOT";
    pub const INSTALL_BINARY_NOT_FOUND: &str = "INSTALL_BINARY_NOT_FOUND";
    pub const INSTALL_SPAWN_FAILED: &str = "INSTALL_SPAWN_FAILED";
}

/// Failures that stop an install before a process is running.
///
/// A non-zero exit is not an error: it is reported as
/// [`InstallOutcome::Failed`](super::InstallOutcome::Failed).
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("no dependencies to install")]
    EmptyRequest,

    #[error("project root not found")]
    NoProjectRoot,

    #[error("{name} not found (searched {search_path})")]
    BinaryNotFound { name: String, search_path: String },

    #[error("failed to spawn {}: {source}", binary.display())]
    SpawnFailed {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyRequest => codes::INSTALL_EMPTY_REQUEST,
            Self::NoProjectRoot => codes::INSTALL_NO_PROJECT_ROOT,
            Self::BinaryNotFound { .. } => codes::INSTALL_BINARY_NOT_FOUND,
            Self::SpawnFailed { .. } => codes::INSTALL_SPAWN_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            InstallError::EmptyRequest,
            InstallError::NoProjectRoot,
            InstallError::BinaryNotFound {
                name: "yarn".into(),
                search_path: "/usr/bin".into(),
            },
            InstallError::SpawnFailed {
                binary: PathBuf::from("/usr/bin/yarn"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        ];
        let mut codes: Vec<_> = errors.iter().map(InstallError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_binary_not_found_message_names_binary() {
        let err = InstallError::BinaryNotFound {
            name: "yarn.cmd".into(),
            search_path: "C:\\node".into(),
        };
        assert!(err.to_string().starts_with("yarn.cmd not found"));
    }
}
