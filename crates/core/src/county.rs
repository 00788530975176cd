use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// One supported county: its inventory code, display name, default parcel
/// layer and default APN format pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct County {
    pub code: u8,
    pub name: &'static str,
    pub layer: &'static str,
    pub apn_pattern: &'static str,
}

/// The 18 counties with parcel layers, ordered by code.
pub const COUNTIES: [County; 18] = [
    County { code: 1, name: "Alameda", layer: "ALA_APN", apn_pattern: r"^\d{1,3}[A-Z]?-\d{1,4}-\d{1,3}(-\d{1,2})?$" },
    County { code: 6, name: "Colusa", layer: "COL_APN", apn_pattern: r"^\d{3}-\d{3}-\d{3}$" },
    County { code: 7, name: "Contra Costa", layer: "CCO_APN", apn_pattern: r"^\d{3}-\d{3}-\d{3}-000$" },
    County { code: 8, name: "Del Norte", layer: "DNO_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
    County { code: 12, name: "Humboldt", layer: "HUM_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
    County { code: 17, name: "Lake", layer: "LAK_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
    County { code: 21, name: "Marin", layer: "MRN_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
    County { code: 23, name: "Mendocino", layer: "MEN_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
    County { code: 27, name: "Monterey", layer: "MNT_APN", apn_pattern: r"^\d{3}-\d{3}-\d{3}$" },
    County { code: 28, name: "Napa", layer: "NAP_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
    County { code: 35, name: "San Benito", layer: "SBN_APN", apn_pattern: r"^\d{3}-\d{3}-\d{3}$" },
    County { code: 38, name: "San Francisco", layer: "SFR_APN", apn_pattern: r"^\d{4}-\d{3}(-[A-Z])?$" },
    County { code: 41, name: "San Mateo", layer: "SMA_APN", apn_pattern: r"^\d{3}-\d{3}-\d{3}$" },
    County { code: 43, name: "Santa Clara", layer: "SCL_APN", apn_pattern: r"^\d{3}-\d{2}-\d{3}$" },
    County { code: 44, name: "Santa Cruz", layer: "SCR_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
    County { code: 48, name: "Solano", layer: "SOL_APN", apn_pattern: r"^\d{3}-\d{3}-\d{3}$" },
    County { code: 49, name: "Sonoma", layer: "SON_APN", apn_pattern: r"^\d{3}-\d{3}-\d{3}$" },
    County { code: 57, name: "Yolo", layer: "YOL_APN", apn_pattern: r"^\d{3}-\d{3}-\d{2}$" },
];

/// A county code known to have a parcel layer. Construction validates
/// against [`COUNTIES`], so every `CountyCode` resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct CountyCode(u8);

impl CountyCode {
    pub fn new(code: i64) -> Result<Self, CoreError> {
        COUNTIES
            .iter()
            .find(|c| i64::from(c.code) == code)
            .map(|c| Self(c.code))
            .ok_or(CoreError::UnknownCounty(code))
    }

    /// Exact (case-sensitive) match against the county display names.
    pub fn from_name(name: &str) -> Option<Self> {
        COUNTIES.iter().find(|c| c.name == name).map(|c| Self(c.code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn county(self) -> &'static County {
        // Invariant: self.0 always comes from COUNTIES.
        COUNTIES
            .iter()
            .find(|c| c.code == self.0)
            .unwrap_or(&COUNTIES[0])
    }

    pub fn name(self) -> &'static str {
        self.county().name
    }

    pub fn all() -> impl Iterator<Item = CountyCode> {
        COUNTIES.iter().map(|c| CountyCode(c.code))
    }
}

impl From<CountyCode> for u8 {
    fn from(c: CountyCode) -> u8 {
        c.0
    }
}

impl fmt::Display for CountyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parcel layer name per county, defaulting to [`County::layer`].
#[derive(Debug, Clone, Default)]
pub struct LayerNames {
    overrides: BTreeMap<CountyCode, String>,
}

impl LayerNames {
    /// Overrides keyed by raw county code; unknown codes are rejected.
    pub fn new(overrides: &BTreeMap<u8, String>) -> Result<Self, CoreError> {
        let mut map = BTreeMap::new();
        for (code, layer) in overrides {
            map.insert(CountyCode::new(i64::from(*code))?, layer.clone());
        }
        Ok(Self { overrides: map })
    }

    pub fn layer(&self, county: CountyCode) -> &str {
        self.overrides
            .get(&county)
            .map(String::as_str)
            .unwrap_or(county.county().layer)
    }
}
