use std::collections::HashSet;

use parcelmap_core::{Apn, ApnPatterns, CountyCode, LayerNames, ParcelMatch};
use tracing::{debug, info, warn};

use crate::error::MapError;
use crate::source::ParcelLayers;

/// Matches found for one record across all its (county, APN) pairs.
#[derive(Debug, Default)]
pub struct RecordMatches {
    pub matches: Vec<ParcelMatch>,
    /// True when any APN failed its county's format pattern.
    pub malformed: bool,
}

/// Searches county parcel layers for APNs.
///
/// Holds the per-run "selection cleared" set: each county's layer is
/// cleared once, immediately before its first search in the run.
pub struct ApnMatcher<'a, L> {
    layers: &'a mut L,
    names: &'a LayerNames,
    patterns: &'a ApnPatterns,
    cleared: HashSet<CountyCode>,
}

impl<'a, L: ParcelLayers> ApnMatcher<'a, L> {
    pub fn new(layers: &'a mut L, names: &'a LayerNames, patterns: &'a ApnPatterns) -> Self {
        Self {
            layers,
            names,
            patterns,
            cleared: HashSet::new(),
        }
    }

    /// Search every APN in every county, counties outer.
    pub fn match_record(&mut self, counties: &[CountyCode], apns: &[Apn]) -> Result<RecordMatches, MapError> {
        let mut out = RecordMatches::default();

        for &county in counties {
            let layer = self.names.layer(county);
            if self.cleared.insert(county) {
                debug!(layer, "clearing layer selection");
                self.layers.clear_selection(layer)?;
            }

            for apn in apns {
                if !self.patterns.is_well_formed(county, apn) {
                    warn!("      APN '{apn}' in {county} county may not be well-formed");
                    out.malformed = true;
                }

                let found = self.layers.search(layer, apn)?;
                info!("     searching for APN {apn} in {layer}: found {} parcels", found.len());
                out.matches.extend(found.into_iter().map(|geometry| ParcelMatch {
                    county,
                    apn: apn.clone(),
                    geometry,
                }));
            }
        }

        Ok(out)
    }
}
