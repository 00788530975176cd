use parcelmap_core::{distinct_apns, Apn, CountyCode, ParentRecord, SelectionEntry};
use tracing::{info, warn};

use crate::error::MapError;
use crate::source::InventorySource;

/// Why an identifier produced no search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No parent row in the inventory.
    MissingRecord,
    Voided,
    NoApn,
    /// Report with no county association that names a supported county.
    NoCounty,
    /// Resource whose county code has no parcel layer.
    UnsupportedCounty(i64),
}

/// A record ready for APN matching.
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub entry: SelectionEntry,
    pub parent: ParentRecord,
    /// Layers to search, in association order, without repeats.
    pub counties: Vec<CountyCode>,
    pub apns: Vec<Apn>,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(ResolvedRecord),
    Skipped(SkipReason),
}

/// Fetch everything needed to map one identifier.
///
/// Queries run parent, then addresses, then (reports only) counties, and
/// stop at the first skip condition.
pub fn resolve<I: InventorySource>(db: &mut I, entry: SelectionEntry) -> Result<Resolution, MapError> {
    match entry {
        SelectionEntry::Report { doc_no } => resolve_report(db, entry, doc_no),
        SelectionEntry::Resource { prim_co, prim_no } => resolve_resource(db, entry, prim_co, prim_no),
    }
}

fn resolve_report<I: InventorySource>(
    db: &mut I,
    entry: SelectionEntry,
    doc_no: i64,
) -> Result<Resolution, MapError> {
    let Some(parent) = db.report_parent(doc_no)? else {
        warn!("     {entry} not found in inventory");
        return Ok(Resolution::Skipped(SkipReason::MissingRecord));
    };
    if parent.voided {
        info!("     {entry} is marked VOIDED");
        return Ok(Resolution::Skipped(SkipReason::Voided));
    }

    let apns = distinct_apns(db.report_apns(doc_no)?);
    info!("     {} APN's found in inventory", apns.len());
    if apns.is_empty() {
        return Ok(Resolution::Skipped(SkipReason::NoApn));
    }

    let mut counties: Vec<CountyCode> = Vec::new();
    for name in db.report_counties(doc_no)?.into_iter().flatten() {
        match CountyCode::from_name(&name) {
            Some(cc) if !counties.contains(&cc) => counties.push(cc),
            Some(_) => {}
            None => warn!("     {entry}: county '{name}' has no parcel layer"),
        }
    }
    if counties.is_empty() {
        info!("     {entry} has no county specified");
        return Ok(Resolution::Skipped(SkipReason::NoCounty));
    }

    Ok(Resolution::Resolved(ResolvedRecord { entry, parent, counties, apns }))
}

fn resolve_resource<I: InventorySource>(
    db: &mut I,
    entry: SelectionEntry,
    prim_co: i64,
    prim_no: i64,
) -> Result<Resolution, MapError> {
    let Some(parent) = db.resource_parent(prim_co, prim_no)? else {
        warn!("     {entry} not found in inventory");
        return Ok(Resolution::Skipped(SkipReason::MissingRecord));
    };
    if parent.voided {
        info!("     {entry} is marked VOIDED");
        return Ok(Resolution::Skipped(SkipReason::Voided));
    }

    let apns = distinct_apns(db.resource_apns(prim_co, prim_no)?);
    info!("     {} APN's found in inventory", apns.len());
    if apns.is_empty() {
        return Ok(Resolution::Skipped(SkipReason::NoApn));
    }

    let Ok(county) = CountyCode::new(prim_co) else {
        warn!("     {entry}: county {prim_co} has no parcel layer");
        return Ok(Resolution::Skipped(SkipReason::UnsupportedCounty(prim_co)));
    };

    Ok(Resolution::Resolved(ResolvedRecord {
        entry,
        parent,
        counties: vec![county],
        apns,
    }))
}
