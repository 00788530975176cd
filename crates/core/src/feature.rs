use chrono::NaiveDate;

use crate::apn::Apn;
use crate::county::CountyCode;

/// Polygon geometry as the parcel layer stores it (GeoPackage binary).
/// Copied to the output untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct Geometry(pub Vec<u8>);

impl std::fmt::Debug for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Geometry({} bytes)", self.0.len())
    }
}

/// One polygon found in a county layer for one APN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelMatch {
    pub county: CountyCode,
    pub apn: Apn,
    pub geometry: Geometry,
}

/// Identifier fields of an output feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureIdent {
    /// `DocCo` is the county whose layer produced the geometry.
    Report { doc_co: CountyCode, doc_no: i64 },
    /// `TrinNo` is `None` unless the inventory holds a positive number.
    Resource { prim_co: CountyCode, prim_no: i64, trin_no: Option<i64> },
}

/// A row bound for the output feature class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFeature {
    pub geometry: Geometry,
    pub ident: FeatureIdent,
    pub other_id: String,
    pub doc_source: String,
    pub dig_source: String,
    pub dig_by: String,
    pub dig_date: NaiveDate,
    pub dig_org: String,
    pub notes: String,
}
