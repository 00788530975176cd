// In-memory collaborators for unit tests

use std::collections::HashMap;

use parcelmap_core::{Apn, Geometry, OutputFeature, ParentRecord};

use crate::error::MapError;
use crate::source::{FeatureSink, InventorySource, ParcelLayers};

#[derive(Default)]
pub struct FakeInventory {
    pub reports: HashMap<i64, ParentRecord>,
    pub report_addrs: HashMap<i64, Vec<Option<String>>>,
    pub report_counties: HashMap<i64, Vec<Option<String>>>,
    pub resources: HashMap<(i64, i64), ParentRecord>,
    pub resource_addrs: HashMap<(i64, i64), Vec<Option<String>>>,
    /// Every query issued, in order: "parent", "addr", "cnty".
    pub calls: Vec<String>,
}

impl FakeInventory {
    pub fn report(mut self, doc_no: i64, parent: ParentRecord, apns: &[&str], counties: &[&str]) -> Self {
        self.reports.insert(doc_no, parent);
        self.report_addrs
            .insert(doc_no, apns.iter().map(|a| Some(a.to_string())).collect());
        self.report_counties
            .insert(doc_no, counties.iter().map(|c| Some(c.to_string())).collect());
        self
    }

    pub fn resource(mut self, prim_co: i64, prim_no: i64, parent: ParentRecord, apns: &[&str]) -> Self {
        self.resources.insert((prim_co, prim_no), parent);
        self.resource_addrs.insert(
            (prim_co, prim_no),
            apns.iter().map(|a| Some(a.to_string())).collect(),
        );
        self
    }
}

impl InventorySource for FakeInventory {
    fn report_parent(&mut self, doc_no: i64) -> Result<Option<ParentRecord>, MapError> {
        self.calls.push(format!("parent S-{doc_no}"));
        Ok(self.reports.get(&doc_no).cloned())
    }

    fn report_apns(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.calls.push(format!("addr S-{doc_no}"));
        Ok(self.report_addrs.get(&doc_no).cloned().unwrap_or_default())
    }

    fn report_counties(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.calls.push(format!("cnty S-{doc_no}"));
        Ok(self.report_counties.get(&doc_no).cloned().unwrap_or_default())
    }

    fn resource_parent(&mut self, prim_co: i64, prim_no: i64) -> Result<Option<ParentRecord>, MapError> {
        self.calls.push(format!("parent P-{prim_co}-{prim_no}"));
        Ok(self.resources.get(&(prim_co, prim_no)).cloned())
    }

    fn resource_apns(&mut self, prim_co: i64, prim_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.calls.push(format!("addr P-{prim_co}-{prim_no}"));
        Ok(self
            .resource_addrs
            .get(&(prim_co, prim_no))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeLayers {
    /// (layer, apn) -> polygons
    pub parcels: HashMap<(String, String), Vec<Geometry>>,
    pub clears: Vec<String>,
    pub searches: Vec<(String, String)>,
}

impl FakeLayers {
    pub fn with(mut self, layer: &str, apn: &str, polygons: usize) -> Self {
        let geoms = (0..polygons)
            .map(|i| Geometry(format!("{layer}:{apn}:{i}").into_bytes()))
            .collect();
        self.parcels.insert((layer.to_string(), apn.to_string()), geoms);
        self
    }
}

impl ParcelLayers for FakeLayers {
    fn clear_selection(&mut self, layer: &str) -> Result<(), MapError> {
        self.clears.push(layer.to_string());
        Ok(())
    }

    fn search(&mut self, layer: &str, apn: &Apn) -> Result<Vec<Geometry>, MapError> {
        self.searches.push((layer.to_string(), apn.to_string()));
        Ok(self
            .parcels
            .get(&(layer.to_string(), apn.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct VecSink {
    pub features: Vec<OutputFeature>,
}

impl FeatureSink for VecSink {
    fn insert(&mut self, feature: &OutputFeature) -> Result<(), MapError> {
        self.features.push(feature.clone());
        Ok(())
    }
}
