// Heritage inventory backends

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

use std::path::Path;

use thiserror::Error;

use parcelmap_core::ParentRecord;
use parcelmap_mapper::{InventorySource, MapError};

#[cfg(feature = "postgres")]
pub use postgres::PgInventory;
pub use sqlite::SqliteInventory;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("cannot connect to inventory {target}: {message}")]
    Connect { target: String, message: String },
    #[error("inventory backend '{0}' is not built into this binary")]
    Unavailable(&'static str),
}

/// The configured inventory backend.
pub enum Inventory {
    Sqlite(SqliteInventory),
    #[cfg(feature = "postgres")]
    Postgres(PgInventory),
}

impl Inventory {
    pub fn sqlite(path: &Path) -> Result<Self, InventoryError> {
        SqliteInventory::open(path).map(Self::Sqlite)
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(host: &str, port: Option<u16>, database: &str) -> Result<Self, InventoryError> {
        PgInventory::connect(host, port, database).map(Self::Postgres)
    }

    #[cfg(not(feature = "postgres"))]
    pub fn postgres(_host: &str, _port: Option<u16>, _database: &str) -> Result<Self, InventoryError> {
        Err(InventoryError::Unavailable("postgres"))
    }
}

macro_rules! each_backend {
    ($self:ident, $db:ident => $call:expr) => {
        match $self {
            Inventory::Sqlite($db) => $call,
            #[cfg(feature = "postgres")]
            Inventory::Postgres($db) => $call,
        }
    };
}

impl InventorySource for Inventory {
    fn report_parent(&mut self, doc_no: i64) -> Result<Option<ParentRecord>, MapError> {
        each_backend!(self, db => db.report_parent(doc_no))
    }

    fn report_apns(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        each_backend!(self, db => db.report_apns(doc_no))
    }

    fn report_counties(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        each_backend!(self, db => db.report_counties(doc_no))
    }

    fn resource_parent(&mut self, prim_co: i64, prim_no: i64) -> Result<Option<ParentRecord>, MapError> {
        each_backend!(self, db => db.resource_parent(prim_co, prim_no))
    }

    fn resource_apns(&mut self, prim_co: i64, prim_no: i64) -> Result<Vec<Option<String>>, MapError> {
        each_backend!(self, db => db.resource_apns(prim_co, prim_no))
    }
}

fn query_err(e: impl std::fmt::Display) -> MapError {
    MapError::Inventory(e.to_string())
}
