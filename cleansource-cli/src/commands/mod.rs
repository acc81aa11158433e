//! Command handlers -- one module per subcommand

pub mod config;
pub mod detect;
pub mod fingerprint;
pub mod scan;

use std::path::{Path, PathBuf};

use tracing::debug;

use cleansource_core::config::CleansourceConfig;
use cleansource_core::error::{CleansourceError, ConfigError};

use crate::error::CliError;

/// Load the effective configuration.
///
/// A missing file is not an error: defaults are used, environment overrides
/// still apply, and the result is validated like a loaded file.
pub async fn load_config(path: &Path) -> Result<CleansourceConfig, CliError> {
    match CleansourceConfig::load(path).await {
        Ok(config) => Ok(config),
        Err(CleansourceError::Config(ConfigError::FileNotFound { .. })) => {
            debug!(path = %path.display(), "config file not found, using defaults");
            let mut config = CleansourceConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

/// Scan root from the command line, falling back to `scan.root_dir`.
pub(crate) fn resolve_root(path: Option<PathBuf>, config: &CleansourceConfig) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from(&config.scan.root_dir))
}
