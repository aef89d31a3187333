use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "DEPSEL_CONFIG";

/// Find the package directory owning `start`.
///
/// Walks up from `start` (or its parent when `start` is a file) and returns the
/// first directory containing a `package.json`.
#[must_use]
pub fn project_root(start: &Path) -> Option<PathBuf> {
    let mut current = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };

    loop {
        if current.join("package.json").is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Location of the user config file.
///
/// `DEPSEL_CONFIG` wins; otherwise `<config dir>/depsel/config.json`.
#[must_use]
pub fn config_file() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs_next::config_dir().map(|dir| dir.join("depsel").join("config.json"))
}
