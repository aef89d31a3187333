use std::path::PathBuf;
use thiserror::Error;

/// Core error type for depsel configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown package manager '{0}' (expected npm, yarn or cnpm)")]
    UnknownManager(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_name_the_file() {
        let err = Error::ConfigRead {
            path: PathBuf::from("/home/me/.config/depsel/config.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err
            .to_string()
            .starts_with("Failed to read config at /home/me/.config/depsel/config.json"));
    }

    #[test]
    fn test_unknown_manager_lists_choices() {
        let err = Error::UnknownManager("pnpm".into());
        assert_eq!(
            err.to_string(),
            "Unknown package manager 'pnpm' (expected npm, yarn or cnpm)"
        );
    }
}
