use crate::error::Error;
use crate::install::ManagerChoice;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration for the depsel CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = WARN, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Package manager used for installs.
    pub manager: ManagerChoice,

    /// Extra directories searched for the package manager binary.
    pub search_dirs: Vec<PathBuf>,
}

/// On-disk user configuration (`config.json`).
///
/// ```json
/// { "manager": "yarn", "searchDirs": ["/opt/node/bin"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default)]
    pub manager: Option<ManagerChoice>,
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
}

impl FileConfig {
    /// Read a config file. A missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            manager: ManagerChoice::default(),
            search_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Create a config for `cwd`, layered with the user config file if present.
    pub fn load(cwd: PathBuf) -> Result<Self, Error> {
        let config = Self::new(cwd);
        match paths::config_file() {
            Some(path) => Ok(match FileConfig::load(&path)? {
                Some(file) => config.with_file(file),
                None => config,
            }),
            None => Ok(config),
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the package manager.
    #[must_use]
    pub fn with_manager(mut self, manager: ManagerChoice) -> Self {
        self.manager = manager;
        self
    }

    /// Set extra binary search directories.
    #[must_use]
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    /// Apply values from a config file on top of the current ones.
    #[must_use]
    pub fn with_file(mut self, file: FileConfig) -> Self {
        if let Some(manager) = file.manager {
            self.manager = manager;
        }
        if !file.search_dirs.is_empty() {
            self.search_dirs = file.search_dirs;
        }
        self
    }
}
