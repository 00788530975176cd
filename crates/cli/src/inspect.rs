// mapbyapn check / counties - read-only views of a selection and the county table

use std::path::Path;

use serde::Serialize;

use parcelmap_config::Settings;
use parcelmap_core::CountyCode;
use parcelmap_io::load_selection;

use crate::CliError;

#[derive(Serialize)]
struct CountyRow<'a> {
    code: u8,
    name: &'static str,
    layer: &'a str,
    apn_pattern: Option<&'a str>,
}

pub fn cmd_check(workbook: &Path, json: bool) -> Result<(), CliError> {
    if !workbook.is_file() {
        return Err(CliError::usage(format!("workbook not found: {}", workbook.display())));
    }
    let selection = load_selection(workbook)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&selection)?);
        return Ok(());
    }

    println!("{}: {} {}", selection.sheet, selection.len(), selection.kind);
    for entry in &selection.entries {
        println!("{entry}");
    }
    Ok(())
}

pub fn cmd_counties(config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let settings = Settings::load(config)?;
    let names = settings.layer_names()?;
    let patterns = settings.apn_patterns()?;

    let rows: Vec<CountyRow> = CountyCode::all()
        .map(|cc| CountyRow {
            code: cc.code(),
            name: cc.name(),
            layer: names.layer(cc),
            apn_pattern: patterns.pattern(cc),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!(
            "{:>2}  {:<14} {:<10} {}",
            row.code,
            row.name,
            row.layer,
            row.apn_pattern.unwrap_or("-")
        );
    }
    Ok(())
}
