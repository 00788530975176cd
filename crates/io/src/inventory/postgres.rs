// PostgreSQL inventory over a single-connection sqlx pool

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use parcelmap_core::ParentRecord;
use parcelmap_mapper::{InventorySource, MapError};

use super::{query_err, InventoryError};

const REPORT_PARENT: &str = r#"
    SELECT COALESCE(CAST("Voided" AS INTEGER), 0) <> 0 AS voided,
           CAST("CitTitle" AS TEXT) AS name
    FROM "tblInventory"
    WHERE "DocNo" = $1
"#;

const REPORT_APNS: &str = r#"
    SELECT CAST("APN" AS TEXT) AS apn
    FROM "tblInventoryAddr"
    WHERE "DocNo" = $1
"#;

const REPORT_COUNTIES: &str = r#"
    SELECT CAST("CountyName" AS TEXT) AS county
    FROM "tblInventoryCnty"
    WHERE "DocNo" = $1
"#;

const RESOURCE_PARENT: &str = r#"
    SELECT COALESCE(CAST("Voided" AS INTEGER), 0) <> 0 AS voided,
           CAST("ResourceName" AS TEXT) AS name,
           CAST("TrinNo" AS BIGINT) AS trin_no,
           CAST("TrinH" AS TEXT) AS trin_h
    FROM "tblResource"
    WHERE "PrimCo" = $1 AND "PrimNo" = $2
"#;

const RESOURCE_APNS: &str = r#"
    SELECT CAST("APN" AS TEXT) AS apn
    FROM "tblResourceAddr"
    WHERE "PrimCo" = $1 AND "PrimNo" = $2
"#;

/// The pipeline is synchronous; this backend owns a current-thread runtime
/// and blocks on each query. Username and password come from `PGUSER` and
/// `PGPASSWORD`.
pub struct PgInventory {
    rt: Runtime,
    pool: PgPool,
}

impl PgInventory {
    pub fn connect(host: &str, port: Option<u16>, database: &str) -> Result<Self, InventoryError> {
        let target = match port {
            Some(p) => format!("{host}:{p}/{database}"),
            None => format!("{host}/{database}"),
        };
        let connect_err = |message: String| InventoryError::Connect {
            target: target.clone(),
            message,
        };

        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| connect_err(e.to_string()))?;

        let mut options = PgConnectOptions::new().host(host).database(database);
        if let Some(port) = port {
            options = options.port(port);
        }

        let pool = rt
            .block_on(PgPoolOptions::new().max_connections(1).connect_with(options))
            .map_err(|e| connect_err(e.to_string()))?;
        debug!(%target, "postgres inventory connected");

        Ok(Self { rt, pool })
    }

    fn fetch_optional(&self, sql: &'static str, keys: &[i64]) -> Result<Option<PgRow>, MapError> {
        debug!(sql, ?keys, "inventory query");
        let mut query = sqlx::query(sql);
        for key in keys {
            query = query.bind(*key);
        }
        self.rt.block_on(query.fetch_optional(&self.pool)).map_err(query_err)
    }

    fn column(&self, sql: &'static str, keys: &[i64]) -> Result<Vec<Option<String>>, MapError> {
        debug!(sql, ?keys, "inventory query");
        let mut query = sqlx::query(sql);
        for key in keys {
            query = query.bind(*key);
        }
        let rows = self.rt.block_on(query.fetch_all(&self.pool)).map_err(query_err)?;
        rows.iter()
            .map(|row| row.try_get::<Option<String>, _>(0))
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)
    }
}

impl InventorySource for PgInventory {
    fn report_parent(&mut self, doc_no: i64) -> Result<Option<ParentRecord>, MapError> {
        let Some(row) = self.fetch_optional(REPORT_PARENT, &[doc_no])? else {
            return Ok(None);
        };
        Ok(Some(ParentRecord {
            voided: row.try_get("voided").map_err(query_err)?,
            name: row.try_get("name").map_err(query_err)?,
            ..Default::default()
        }))
    }

    fn report_apns(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.column(REPORT_APNS, &[doc_no])
    }

    fn report_counties(&mut self, doc_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.column(REPORT_COUNTIES, &[doc_no])
    }

    fn resource_parent(&mut self, prim_co: i64, prim_no: i64) -> Result<Option<ParentRecord>, MapError> {
        let Some(row) = self.fetch_optional(RESOURCE_PARENT, &[prim_co, prim_no])? else {
            return Ok(None);
        };
        Ok(Some(ParentRecord {
            voided: row.try_get("voided").map_err(query_err)?,
            name: row.try_get("name").map_err(query_err)?,
            trin_no: row.try_get("trin_no").map_err(query_err)?,
            trin_h: row.try_get("trin_h").map_err(query_err)?,
        }))
    }

    fn resource_apns(&mut self, prim_co: i64, prim_no: i64) -> Result<Vec<Option<String>>, MapError> {
        self.column(RESOURCE_APNS, &[prim_co, prim_no])
    }
}
