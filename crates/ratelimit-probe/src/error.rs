//! Error types for rate limit probing

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Errors that stop the probe before or while it starts.
///
/// Failures of individual requests during a trial are never surfaced
/// through this type; they are counted as other errors in the trial result.
#[derive(Error, Debug)]
pub enum ProbeError {
    // === Usage ===
    /// No target URL was given
    #[error("URL parameter is required")]
    MissingUrl,

    /// Unsupported HTTP method
    #[error("Unsupported HTTP method: {0} (expected GET or POST)")]
    InvalidMethod(String),

    // === Configuration ===
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for a probe config
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // === Runtime ===
    /// The shared HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

impl ProbeError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingUrl | Self::InvalidMethod(_) | Self::InvalidConfig(_) => 1,
            Self::ConfigRead { .. } | Self::ConfigParse { .. } => 1,
            Self::ClientBuild(_) => 2,
        }
    }

    /// Whether the usage text should be printed alongside the error
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::MissingUrl | Self::InvalidMethod(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_with_one() {
        assert_eq!(ProbeError::MissingUrl.exit_code(), 1);
        assert_eq!(ProbeError::InvalidMethod("PUT".into()).exit_code(), 1);
        assert!(ProbeError::MissingUrl.is_usage_error());
        assert!(!ProbeError::InvalidConfig("step".into()).is_usage_error());
    }

    #[test]
    fn test_error_display() {
        let msg = format!("{}", ProbeError::InvalidMethod("DELETE".into()));
        assert!(msg.contains("DELETE"));
        assert!(msg.contains("GET or POST"));

        let msg = format!("{}", ProbeError::MissingUrl);
        assert_eq!(msg, "URL parameter is required");
    }
}
