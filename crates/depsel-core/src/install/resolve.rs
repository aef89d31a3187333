//! Locating the package manager executable.

use super::error::InstallError;
use super::manager::ManagerChoice;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Directories appended after `PATH`, for editors launched with a bare environment.
pub const FALLBACK_DIRS: &[&str] = &["/usr/bin/node", "/usr/local/bin"];

/// Platform family, as far as executable naming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// File name searched for: package managers ship `.cmd` shims on Windows.
    #[must_use]
    pub fn executable_name(self, manager: ManagerChoice) -> String {
        match self {
            Self::Windows => format!("{}.cmd", manager.as_str()),
            Self::Unix => manager.as_str().to_string(),
        }
    }
}

/// Ordered, duplicate-free list of directories to search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Search exactly `dirs`, in order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut path = Self::default();
        for dir in dirs {
            path.push(dir.into());
        }
        path
    }

    /// `PATH`, then `extra`, then the fixed fallback directories.
    #[must_use]
    pub fn from_env(extra: &[PathBuf]) -> Self {
        let env_dirs = std::env::var_os("PATH")
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();

        let mut path = Self::new(env_dirs);
        for dir in extra {
            path.push(dir.clone());
        }
        for dir in FALLBACK_DIRS {
            path.push(PathBuf::from(dir));
        }
        path
    }

    fn push(&mut self, dir: PathBuf) {
        if !dir.as_os_str().is_empty() && !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Join into a `PATH`-style value; directories that cannot be joined are skipped.
    #[must_use]
    pub fn to_os_string(&self) -> OsString {
        let joinable = self
            .dirs
            .iter()
            .filter(|dir| std::env::join_paths([dir.as_path()]).is_ok());
        std::env::join_paths(joinable).unwrap_or_default()
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_os_string().to_string_lossy())
    }
}

/// Find the executable for `manager` on `search_path`.
///
/// `cwd` only matters for relative entries in the search path.
pub fn resolve_binary(
    manager: ManagerChoice,
    search_path: &SearchPath,
    platform: Platform,
    cwd: &Path,
) -> Result<PathBuf, InstallError> {
    let name = platform.executable_name(manager);
    which::which_in(&name, Some(search_path.to_os_string()), cwd).map_err(|_| {
        InstallError::BinaryNotFound {
            name,
            search_path: search_path.to_string(),
        }
    })
}
