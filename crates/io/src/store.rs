// Output GeoPackage: container, per-run feature classes, feature inserts

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::{debug, info};

use parcelmap_core::naming;
use parcelmap_core::{FeatureIdent, OutputFeature, SelectionKind};
use parcelmap_mapper::{FeatureSink, MapError};

use crate::gpkg::{self, quote_ident, SpatialRef};

/// Geometry type registered for every output class.
const GEOMETRY_TYPE: &str = "MULTIPOLYGON";

const REPORT_FIELDS: &str = r#"
    "DocCo" INTEGER NOT NULL,
    "DocNo" INTEGER NOT NULL,"#;

const RESOURCE_FIELDS: &str = r#"
    "PrimCo" INTEGER NOT NULL,
    "PrimNo" INTEGER NOT NULL,
    "TrinNo" INTEGER,"#;

const COMMON_FIELDS: &str = r#"
    "OtherID" TEXT,
    "DocSource" TEXT,
    "DigSource" TEXT,
    "DigBy" TEXT,
    "DigDate" DATE,
    "DigOrg" TEXT,
    "Notes" TEXT"#;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open output container {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("output container: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// The output GeoPackage, opened for the whole run.
pub struct FeatureStore {
    conn: Connection,
    path: PathBuf,
}

impl FeatureStore {
    /// Open `path`, creating the container and its core tables if needed.
    pub fn open_or_create(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|source| StoreError::Open { path: path.to_path_buf(), source })?;
        if !gpkg::has_core_tables(&conn)? {
            info!("Creating output container {}", path.display());
            gpkg::init_core(&conn)?;
        }
        Ok(Self { conn, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First unused `<base>_APN_<seq>`; names compare case-insensitively
    /// against every table, view and registered content.
    pub fn next_feature_name(&self, base: &str) -> Result<String, StoreError> {
        let mut taken: HashSet<String> = HashSet::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') \
                 UNION SELECT table_name FROM gpkg_contents",
            )?;
            let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for name in names {
                taken.insert(name?.to_lowercase());
            }
        }
        Ok(naming::next_feature_name(base, |candidate| {
            taken.contains(&candidate.to_lowercase())
        }))
    }

    /// Create and register a feature class from the template for `kind`.
    /// `srs` is registered in the container if missing; `None` means the
    /// undefined reference (srs_id 0).
    pub fn create_feature_class(
        &self,
        kind: SelectionKind,
        name: &str,
        srs: Option<&SpatialRef>,
    ) -> Result<FeatureClass<'_>, StoreError> {
        let srs_id = match srs {
            Some(srs) => {
                gpkg::insert_spatial_ref(&self.conn, srs)?;
                srs.srs_id
            }
            None => 0,
        };

        let fields = match kind {
            SelectionKind::Reports => REPORT_FIELDS,
            SelectionKind::Resources => RESOURCE_FIELDS,
        };
        let ddl = format!(
            "CREATE TABLE {} (\n    \"fid\" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n    \"geom\" {GEOMETRY_TYPE},{fields}{COMMON_FIELDS}\n)",
            quote_ident(name)
        );
        debug!(%ddl, "create feature class");

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&ddl)?;
        tx.execute(
            "INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id) \
             VALUES (?1, 'features', ?1, ?2)",
            params![name, srs_id],
        )?;
        tx.execute(
            "INSERT INTO gpkg_geometry_columns \
             (table_name, column_name, geometry_type_name, srs_id, z, m) \
             VALUES (?1, 'geom', ?2, ?3, 0, 0)",
            params![name, GEOMETRY_TYPE, srs_id],
        )?;
        tx.commit()?;

        info!("Created feature class {name} ({kind} template, srs {srs_id})");
        Ok(FeatureClass {
            conn: &self.conn,
            name: name.to_string(),
            kind,
            location: format!("{}/{}", self.path.display(), name),
        })
    }
}

/// An open output feature class. Each insert commits on its own.
pub struct FeatureClass<'a> {
    conn: &'a Connection,
    name: String,
    kind: SelectionKind,
    location: String,
}

impl FeatureClass<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<container>/<feature class>`
    pub fn location(&self) -> &str {
        &self.location
    }

    fn store_err(&self, e: rusqlite::Error) -> MapError {
        MapError::Store(format!("{}: {e}", self.name))
    }
}

impl FeatureSink for FeatureClass<'_> {
    fn insert(&mut self, feature: &OutputFeature) -> Result<(), MapError> {
        let dig_date = feature.dig_date.format("%Y-%m-%d").to_string();
        let table = quote_ident(&self.name);

        let result = match (self.kind, feature.ident) {
            (SelectionKind::Reports, FeatureIdent::Report { doc_co, doc_no }) => self.conn.execute(
                &format!(
                    "INSERT INTO {table} (geom, DocCo, DocNo, OtherID, DocSource, DigSource, \
                     DigBy, DigDate, DigOrg, Notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    feature.geometry.0,
                    doc_co.code(),
                    doc_no,
                    feature.other_id,
                    feature.doc_source,
                    feature.dig_source,
                    feature.dig_by,
                    dig_date,
                    feature.dig_org,
                    feature.notes
                ],
            ),
            (SelectionKind::Resources, FeatureIdent::Resource { prim_co, prim_no, trin_no }) => {
                self.conn.execute(
                    &format!(
                        "INSERT INTO {table} (geom, PrimCo, PrimNo, TrinNo, OtherID, DocSource, \
                         DigSource, DigBy, DigDate, DigOrg, Notes) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                    ),
                    params![
                        feature.geometry.0,
                        prim_co.code(),
                        prim_no,
                        trin_no,
                        feature.other_id,
                        feature.doc_source,
                        feature.dig_source,
                        feature.dig_by,
                        dig_date,
                        feature.dig_org,
                        feature.notes
                    ],
                )
            }
            (kind, _) => {
                return Err(MapError::Store(format!(
                    "{}: feature does not fit the {kind} template",
                    self.name
                )))
            }
        };

        result.map(|_| ()).map_err(|e| self.store_err(e))
    }
}
