// mapbyapn - map saved inventory selections to county parcels by APN

mod exit_codes;
mod inspect;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parcelmap_config::ConfigError;
use parcelmap_io::{InventoryError, LayerError, SelectionError, StoreError};
use parcelmap_mapper::MapError;

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_INVENTORY, EXIT_OUTPUT, EXIT_PARCELS, EXIT_SELECTION, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "mapbyapn")]
#[command(about = "Map saved inventory selections to county parcel polygons by APN")]
#[command(version)]
struct Cli {
    /// Settings file [default: <config dir>/parcelmap/settings.toml]
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug-level logging (SQL, selection clears)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the parcel polygons of every record in a saved selection into a
    /// new feature class
    #[command(after_help = "\
Inventory connection (environment):
  ICDB_sqlserv   database host (postgres backend)
  ICDB_sqlport   database port (optional)
  ICDB_sqldb     database name, or file path for the sqlite backend
  PGUSER / PGPASSWORD are honored by the postgres backend.

Output:
  mapByAPN.gpkg next to the workbook, feature class <workbook>_APN_<n>.

Examples:
  mapbyapn run ~/selections/survey.xlsx --parcels ~/gis/basemap.gpkg
  mapbyapn run res_select.xlsx --json > tally.json")]
    Run {
        /// Saved-selection workbook (tblInvSelect or tblResSelect sheet)
        workbook: PathBuf,

        /// Parcel basemap GeoPackage
        #[arg(long, env = "PARCELMAP_PARCELS", value_name = "GPKG")]
        parcels: Option<PathBuf>,

        /// Also print the tally as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Load and validate a saved selection without touching any database
    Check {
        workbook: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// List supported counties with their layer names and APN patterns
    Counties {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run { workbook, parcels, json } => {
            run::cmd_run(&workbook, cli.config.as_deref(), parcels, json)
        }
        Commands::Check { workbook, json } => inspect::cmd_check(&workbook, json),
        Commands::Counties { json } => inspect::cmd_counties(cli.config.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// `RUST_LOG` wins over `-v`/`-q`. Events go to stderr so stdout stays
/// clean for `--json`.
fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<SelectionError> for CliError {
    fn from(err: SelectionError) -> Self {
        let hint = match &err {
            SelectionError::NoSelectionSheet { .. } | SelectionError::Header { .. } => {
                Some("export the selection from the inventory with \"save selection\"".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_SELECTION, message: err.to_string(), hint }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::MissingEnv(_) => {
                Some("set ICDB_sqlserv and ICDB_sqldb (ICDB_sqlport optional)".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }
}

impl From<InventoryError> for CliError {
    fn from(err: InventoryError) -> Self {
        Self { code: EXIT_INVENTORY, message: err.to_string(), hint: None }
    }
}

impl From<LayerError> for CliError {
    fn from(err: LayerError) -> Self {
        Self { code: EXIT_PARCELS, message: err.to_string(), hint: None }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self { code: EXIT_OUTPUT, message: err.to_string(), hint: None }
    }
}

impl From<MapError> for CliError {
    fn from(err: MapError) -> Self {
        let code = match &err {
            MapError::Inventory(_) => EXIT_INVENTORY,
            MapError::Layer { .. } => EXIT_PARCELS,
            MapError::Store(_) => EXIT_OUTPUT,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::general(format!("JSON output: {err}"))
    }
}
