// Collaborator seams: inventory database, parcel layers, output store

use parcelmap_core::{Apn, Geometry, OutputFeature, ParentRecord};

use crate::error::MapError;

/// Read access to the heritage inventory.
///
/// Address and county queries return raw column values (`None` for SQL
/// NULL) in the order the database yields them; normalization happens in
/// the resolver.
pub trait InventorySource {
    /// `tblInventory` row for a report.
    fn report_parent(&mut self, doc_no: i64) -> Result<Option<ParentRecord>, MapError>;
    /// `tblInventoryAddr.APN` values for a report.
    fn report_apns(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError>;
    /// `tblInventoryCnty.CountyName` values for a report.
    fn report_counties(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError>;
    /// `tblResource` row for a resource.
    fn resource_parent(&mut self, prim_co: i64, prim_no: i64) -> Result<Option<ParentRecord>, MapError>;
    /// `tblResourceAddr.APN` values for a resource.
    fn resource_apns(&mut self, prim_co: i64, prim_no: i64) -> Result<Vec<Option<String>>, MapError>;
}

/// Per-county parcel polygon layers, addressed by layer name.
pub trait ParcelLayers {
    /// Drop any selection left on the layer by earlier interactive work.
    fn clear_selection(&mut self, layer: &str) -> Result<(), MapError>;
    /// Every polygon whose `APN` attribute equals `apn` exactly.
    fn search(&mut self, layer: &str, apn: &Apn) -> Result<Vec<Geometry>, MapError>;
}

/// The output feature class for this run.
pub trait FeatureSink {
    fn insert(&mut self, feature: &OutputFeature) -> Result<(), MapError>;
}
