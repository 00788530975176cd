use chrono::NaiveDate;
use parcelmap_core::{FeatureIdent, OutputFeature, ParcelMatch, SelectionEntry};

use crate::resolver::ResolvedRecord;

/// Provenance stamped on every feature of a run. Built once at startup so
/// every row carries the same run date.
#[derive(Debug, Clone)]
pub struct Provenance {
    /// `DigBy`
    pub operator: String,
    /// `DigDate`
    pub run_date: NaiveDate,
    /// `DigOrg`
    pub organization: String,
    /// `DocSource` and `DigSource`
    pub source_marker: String,
}

/// `Notes` text; always names the APN that produced the geometry.
pub fn feature_note(trinomial: Option<&str>, apn: &str) -> String {
    match trinomial {
        Some(t) => format!("{t}; automap APN:{apn}"),
        None => format!("automap APN:{apn}"),
    }
}

/// One output row for one parcel polygon of a resolved record.
pub fn build_feature(record: &ResolvedRecord, hit: &ParcelMatch, prov: &Provenance) -> OutputFeature {
    let (ident, notes) = match record.entry {
        SelectionEntry::Report { doc_no } => (
            FeatureIdent::Report { doc_co: hit.county, doc_no },
            feature_note(None, hit.apn.as_str()),
        ),
        SelectionEntry::Resource { prim_no, .. } => (
            FeatureIdent::Resource {
                prim_co: hit.county,
                prim_no,
                trin_no: record.parent.positive_trin_no(),
            },
            feature_note(record.parent.trinomial(), hit.apn.as_str()),
        ),
    };

    OutputFeature {
        geometry: hit.geometry.clone(),
        ident,
        other_id: record.parent.display_name().to_string(),
        doc_source: prov.source_marker.clone(),
        dig_source: prov.source_marker.clone(),
        dig_by: prov.operator.clone(),
        dig_date: prov.run_date,
        dig_org: prov.organization.clone(),
        notes,
    }
}
