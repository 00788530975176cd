// mapbyapn run - the full selection -> inventory -> parcels -> output pipeline

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use parcelmap_config::{operator_name, InventoryBackend, InventoryConnection, Settings};
use parcelmap_core::naming::feature_base_name;
use parcelmap_core::{Selection, SelectionKind};
use parcelmap_io::{load_selection, FeatureStore, GeoPackageLayers, Inventory};
use parcelmap_mapper::{Provenance, RunOptions, Tally};

use crate::CliError;

#[derive(Serialize)]
struct RunReport<'a> {
    kind: SelectionKind,
    sheet: &'a str,
    feature_class: &'a str,
    tally: &'a Tally,
}

pub fn cmd_run(
    workbook: &Path,
    config: Option<&Path>,
    parcels: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    if !workbook.is_file() {
        return Err(CliError::usage(format!("workbook not found: {}", workbook.display())));
    }

    let selection = load_selection(workbook)?;
    info!(
        "{}: {} {} in sheet {}",
        workbook.display(),
        selection.len(),
        selection.kind,
        selection.sheet
    );

    let settings = Settings::load(config)?;
    let layer_names = settings.layer_names()?;
    let patterns = settings.apn_patterns()?;

    let basemap = parcels.or_else(|| settings.parcels.path.clone()).ok_or_else(|| {
        CliError::config("no parcel basemap configured")
            .with_hint("pass --parcels, set PARCELMAP_PARCELS, or set [parcels] path in settings.toml")
    })?;

    let mut inventory = open_inventory(settings.inventory.backend)?;
    let mut layers = GeoPackageLayers::open(&basemap)?;
    let srs = layers.spatial_ref(&layer_names)?;

    let container = output_dir(workbook).join(&settings.output.container);
    let store = FeatureStore::open_or_create(&container)?;
    let name = store.next_feature_name(&feature_base_name(workbook))?;
    let mut class = store.create_feature_class(selection.kind, &name, srs.as_ref())?;

    let options = RunOptions {
        layer_names,
        patterns,
        provenance: Provenance {
            operator: operator_name(&settings.output, |k| std::env::var(k).ok()),
            run_date: chrono::Local::now().date_naive(),
            organization: settings.output.organization.clone(),
            source_marker: settings.output.source_marker.clone(),
        },
    };

    let tally = parcelmap_mapper::run(&selection, &mut inventory, &mut layers, &mut class, &options)?;

    print_summary(&selection, &tally, class.location());
    if json {
        let report = RunReport {
            kind: selection.kind,
            sheet: &selection.sheet,
            feature_class: class.location(),
            tally: &tally,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn open_inventory(backend: InventoryBackend) -> Result<Inventory, CliError> {
    let conn = InventoryConnection::from_env(backend)?;
    let inventory = match conn.backend {
        InventoryBackend::Sqlite => Inventory::sqlite(Path::new(&conn.database))?,
        InventoryBackend::Postgres => {
            let host = conn.host.as_deref().unwrap_or("localhost");
            Inventory::postgres(host, conn.port, &conn.database)?
        }
    };
    Ok(inventory)
}

/// The container lives next to the input workbook.
fn output_dir(workbook: &Path) -> PathBuf {
    match workbook.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn print_summary(selection: &Selection, tally: &Tally, location: &str) {
    eprintln!();
    for line in tally.summary_lines(selection.kind) {
        eprintln!("{line}");
    }
    eprintln!("Output: {location}");
}
