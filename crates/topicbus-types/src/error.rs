use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading a bus configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display() {
        let err = ConfigError::Read {
            path: PathBuf::from("/tmp/topicbus.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/topicbus.toml"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ConfigError::Parse {
            path: PathBuf::from("topicbus.toml"),
            message: "expected `=`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse config file topicbus.toml: expected `=`"
        );
    }
}
