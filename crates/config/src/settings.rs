// Run settings
// Loaded from --config, else ~/.config/parcelmap/settings.toml, else defaults

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parcelmap_core::{ApnPatterns, LayerNames};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which driver talks to the inventory database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryBackend {
    /// Network server; `ICDB_sqlserv` / `ICDB_sqlport` / `ICDB_sqldb`
    #[default]
    Postgres,
    /// Local database file; `ICDB_sqldb` is the path
    Sqlite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParcelSettings {
    /// Basemap GeoPackage holding one parcel layer per county
    pub path: Option<PathBuf>,

    /// Layer name overrides, keyed by county code ("7" = Contra Costa)
    pub layers: BTreeMap<String, String>,

    /// APN pattern overrides, keyed by county code
    pub patterns: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// GeoPackage created next to the input workbook
    pub container: String,

    /// `DigOrg` value
    pub organization: String,

    /// `DocSource` / `DigSource` value ("p" = parcel/APN)
    pub source_marker: String,

    /// `DigBy` value; login name when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            container: "mapByAPN.gpkg".to_string(),
            organization: "NWIC".to_string(),
            source_marker: "p".to_string(),
            operator: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    pub backend: InventoryBackend,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub parcels: ParcelSettings,
    pub output: OutputSettings,
    pub inventory: InventorySettings,
}

impl Settings {
    /// Default settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parcelmap")
            .join("settings.toml")
    }

    /// Load from `explicit` (must exist), else the default path if present,
    /// else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path();
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };

        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Override tables must name real counties and patterns must compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layer_names()?;
        self.apn_patterns()?;
        Ok(())
    }

    pub fn layer_names(&self) -> Result<LayerNames, ConfigError> {
        let overrides = county_keyed("parcels.layers", &self.parcels.layers)?;
        Ok(LayerNames::new(&overrides)?)
    }

    pub fn apn_patterns(&self) -> Result<ApnPatterns, ConfigError> {
        let overrides = county_keyed("parcels.patterns", &self.parcels.patterns)?;
        Ok(ApnPatterns::new(&overrides)?)
    }
}

fn county_keyed(
    section: &'static str,
    table: &BTreeMap<String, String>,
) -> Result<BTreeMap<u8, String>, ConfigError> {
    table
        .iter()
        .map(|(k, v)| {
            k.trim()
                .parse::<u8>()
                .map(|code| (code, v.clone()))
                .map_err(|_| ConfigError::BadCountyKey { section, key: k.clone() })
        })
        .collect()
}
