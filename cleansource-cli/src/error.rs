//! CLI-specific error types and exit code mapping

use cleansource_core::error::{CleansourceError, ConfigError};
use cleansource_scanner::ScannerError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Fingerprint or scan failure reported by the scanner.
    #[error("scan error: {0}")]
    Scan(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (artifact write, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                  |
    /// |------|--------------------------|
    /// | 0    | Success                  |
    /// | 1    | General / command error  |
    /// | 2    | Configuration error      |
    /// | 4    | Scan failed              |
    /// | 10   | IO error                 |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Scan(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<CleansourceError> for CliError {
    fn from(e: CleansourceError) -> Self {
        match e {
            CleansourceError::Config(inner) => Self::Config(inner.to_string()),
            CleansourceError::Scan(inner) => Self::Scan(inner.to_string()),
            CleansourceError::Io(inner) => Self::Io(inner),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<ScannerError> for CliError {
    fn from(e: ScannerError) -> Self {
        match e {
            ScannerError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Scan(other.to_string()),
        }
    }
}
