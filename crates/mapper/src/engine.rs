use parcelmap_core::{ApnPatterns, LayerNames, Selection};
use tracing::info;

use crate::error::MapError;
use crate::matcher::ApnMatcher;
use crate::resolver::{resolve, Resolution};
use crate::source::{FeatureSink, InventorySource, ParcelLayers};
use crate::tally::Tally;
use crate::writer::{build_feature, Provenance};

/// Everything a run needs besides its collaborators.
pub struct RunOptions {
    pub layer_names: LayerNames,
    pub patterns: ApnPatterns,
    pub provenance: Provenance,
}

/// Map every entry of `selection`, strictly in order: each identifier is
/// resolved, matched and written before the next one starts.
///
/// Skip conditions are tallied. The first collaborator failure aborts the
/// run; features already inserted stay in the sink.
pub fn run<I, L, S>(
    selection: &Selection,
    inventory: &mut I,
    layers: &mut L,
    sink: &mut S,
    options: &RunOptions,
) -> Result<Tally, MapError>
where
    I: InventorySource,
    L: ParcelLayers,
    S: FeatureSink,
{
    info!("Mapping {} by APN ({} input)", selection.kind, selection.len());

    let mut matcher = ApnMatcher::new(layers, &options.layer_names, &options.patterns);
    let mut tally = Tally::default();

    for &entry in &selection.entries {
        info!("{entry}:");
        tally.processed += 1;

        let record = match resolve(inventory, entry)? {
            Resolution::Resolved(record) => record,
            Resolution::Skipped(reason) => {
                tally.record_skip(reason);
                continue;
            }
        };

        let found = matcher.match_record(&record.counties, &record.apns)?;
        tally.record_search(found.matches.len(), found.malformed);

        for hit in &found.matches {
            sink.insert(&build_feature(&record, hit, &options.provenance))?;
            tally.shapes_written += 1;
        }
    }

    Ok(tally)
}
