// SQLite inventory (a local extract of the inventory tables)

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Params};
use tracing::debug;

use parcelmap_core::ParentRecord;
use parcelmap_mapper::{InventorySource, MapError};

use super::{query_err, InventoryError};

const REPORT_PARENT: &str =
    "SELECT COALESCE(Voided, 0) <> 0, CitTitle FROM tblInventory WHERE DocNo = ?1";
const REPORT_APNS: &str = "SELECT CAST(APN AS TEXT) FROM tblInventoryAddr WHERE DocNo = ?1";
const REPORT_COUNTIES: &str = "SELECT CountyName FROM tblInventoryCnty WHERE DocNo = ?1";
const RESOURCE_PARENT: &str = "SELECT COALESCE(Voided, 0) <> 0, ResourceName, CAST(TrinNo AS INTEGER), TrinH \
     FROM tblResource WHERE PrimCo = ?1 AND PrimNo = ?2";
const RESOURCE_APNS: &str =
    "SELECT CAST(APN AS TEXT) FROM tblResourceAddr WHERE PrimCo = ?1 AND PrimNo = ?2";

pub struct SqliteInventory {
    conn: Connection,
}

impl SqliteInventory {
    /// Open an existing inventory file read-only.
    pub fn open(path: &Path) -> Result<Self, InventoryError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
            InventoryError::Connect {
                target: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        debug!(path = %path.display(), "sqlite inventory opened");
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn column<P: Params>(&self, sql: &str, args: P) -> Result<Vec<Option<String>>, MapError> {
        debug!(sql, "inventory query");
        let mut stmt = self.conn.prepare_cached(sql).map_err(query_err)?;
        let rows = stmt.query_map(args, |row| row.get::<_, Option<String>>(0)).map_err(query_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }
}

impl InventorySource for SqliteInventory {
    fn report_parent(&mut self, doc_no: i64) -> Result<Option<ParentRecord>, MapError> {
        debug!(sql = REPORT_PARENT, "inventory query");
        self.conn
            .query_row(REPORT_PARENT, params![doc_no], |row| {
                Ok(ParentRecord {
                    voided: row.get(0)?,
                    name: row.get(1)?,
                    ..Default::default()
                })
            })
            .optional()
            .map_err(query_err)
    }

    fn report_apns(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.column(REPORT_APNS, params![doc_no])
    }

    fn report_counties(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.column(REPORT_COUNTIES, params![doc_no])
    }

    fn resource_parent(&mut self, prim_co: i64, prim_no: i64) -> Result<Option<ParentRecord>, MapError> {
        debug!(sql = RESOURCE_PARENT, "inventory query");
        self.conn
            .query_row(RESOURCE_PARENT, params![prim_co, prim_no], |row| {
                Ok(ParentRecord {
                    voided: row.get(0)?,
                    name: row.get(1)?,
                    trin_no: row.get(2)?,
                    trin_h: row.get(3)?,
                })
            })
            .optional()
            .map_err(query_err)
    }

    fn resource_apns(&mut self, prim_co: i64, prim_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.column(RESOURCE_APNS, params![prim_co, prim_no])
    }
}
