pub mod install;
pub mod scan;
pub mod session;
pub mod version;

use depsel_core::install::{InstallError, InstallOutcome, ManagerChoice, MemorySurface};
use depsel_core::Config;
use depsel_core::SearchPath;
use serde::Serialize;

/// Exit code for internal errors.
pub const EXIT_ERROR: i32 = 1;

/// Exit code for invalid input.
pub const EXIT_USAGE: i32 = 2;

/// Exit code for a package manager that cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code after an interrupt.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Error info for JSON output.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<&InstallError> for ErrorInfo {
    fn from(err: &InstallError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Result of one install, for JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub exit_code: Option<i32>,
    /// Rendered markup, one entry per line.
    pub output: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl InstallReport {
    pub fn finished(surface: &MemorySurface, outcome: &InstallOutcome) -> Self {
        let exit_code = match outcome {
            InstallOutcome::Succeeded => 0,
            InstallOutcome::Failed { code, .. } => *code,
        };
        Self {
            ok: outcome.is_success(),
            title: Some(surface.title.clone()),
            exit_code: Some(exit_code),
            output: surface.lines.iter().map(|l| l.markup.clone()).collect(),
            error: None,
        }
    }

    pub fn rejected(err: &InstallError) -> Self {
        Self {
            ok: false,
            title: None,
            exit_code: None,
            output: Vec::new(),
            error: Some(err.into()),
        }
    }
}

/// Process exit code for an install that never started.
pub fn exit_code(err: &InstallError) -> i32 {
    match err {
        InstallError::EmptyRequest | InstallError::NoProjectRoot => EXIT_USAGE,
        InstallError::BinaryNotFound { .. } => EXIT_NOT_FOUND,
        InstallError::SpawnFailed { .. } => EXIT_ERROR,
    }
}

/// Process exit code mirroring a finished install.
pub fn outcome_exit_code(outcome: &InstallOutcome) -> i32 {
    match outcome {
        InstallOutcome::Succeeded => 0,
        InstallOutcome::Failed { code, .. } if *code > 0 => *code,
        InstallOutcome::Failed { .. } => EXIT_ERROR,
    }
}

/// Follow-up advice printed after an error in terminal mode.
pub fn hint(err: &InstallError, manager: ManagerChoice) -> Option<String> {
    match err {
        InstallError::NoProjectRoot => {
            Some("run inside a directory with a package.json, or pass --cwd".to_string())
        }
        InstallError::BinaryNotFound { .. } => Some(format!(
            "install {manager}, or add its directory to \"searchDirs\" in the config file"
        )),
        InstallError::EmptyRequest | InstallError::SpawnFailed { .. } => None,
    }
}

/// Directories searched for the package manager.
pub fn search_path(config: &Config) -> SearchPath {
    SearchPath::from_env(&config.search_dirs)
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to encode JSON output: {e}"),
    }
}
