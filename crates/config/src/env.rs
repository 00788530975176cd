//! Inventory connection parameters and operator identity from the
//! environment.
//!
//! Everything reads through a lookup closure so tests never touch the real
//! process environment.

use crate::error::ConfigError;
use crate::settings::{InventoryBackend, OutputSettings};

pub const ENV_SERVER: &str = "ICDB_sqlserv";
pub const ENV_PORT: &str = "ICDB_sqlport";
pub const ENV_DATABASE: &str = "ICDB_sqldb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConnection {
    pub backend: InventoryBackend,
    /// Required for Postgres, ignored for SQLite
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database name, or file path for SQLite
    pub database: String,
}

impl InventoryConnection {
    pub fn from_env(backend: InventoryBackend) -> Result<Self, ConfigError> {
        Self::from_lookup(backend, |k| std::env::var(k).ok())
    }

    pub fn from_lookup(
        backend: InventoryBackend,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database = get(ENV_DATABASE).ok_or(ConfigError::MissingEnv(ENV_DATABASE))?;

        let host = get(ENV_SERVER);
        if backend == InventoryBackend::Postgres && host.is_none() {
            return Err(ConfigError::MissingEnv(ENV_SERVER));
        }

        let port = match get(ENV_PORT) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_PORT,
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(Self { backend, host, port, database })
    }
}

/// `DigBy` value: configured operator, else the login name, else "unknown".
pub fn operator_name(output: &OutputSettings, lookup: impl Fn(&str) -> Option<String>) -> String {
    if let Some(op) = output.operator.as_ref().filter(|o| !o.trim().is_empty()) {
        return op.clone();
    }
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|k| lookup(k).filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}
