use std::path::PathBuf;

use parcelmap_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings parse error: {0}")]
    Parse(String),
    /// Override table key that is not a county code.
    #[error("[{section}] key '{key}' is not a county code")]
    BadCountyKey { section: &'static str, key: String },
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },
    #[error(transparent)]
    County(#[from] CoreError),
}
