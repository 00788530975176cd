// GeoPackage plumbing shared by the parcel reader and the output store

use rusqlite::{params, Connection, OptionalExtension};

/// `PRAGMA application_id` value `GPKG`.
pub const APPLICATION_ID: i32 = 0x4750_4B47;
/// `PRAGMA user_version` for GeoPackage 1.3.
pub const USER_VERSION: i32 = 10300;

/// Core metadata tables every GeoPackage carries.
const CORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);

CREATE TABLE IF NOT EXISTS gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
    CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);

INSERT OR IGNORE INTO gpkg_spatial_ref_sys VALUES
    ('Undefined cartesian SRS', -1, 'NONE', -1, 'undefined', 'undefined cartesian coordinate reference system'),
    ('Undefined geographic SRS', 0, 'NONE', 0, 'undefined', 'undefined geographic coordinate reference system'),
    ('WGS 84 geodetic', 4326, 'EPSG', 4326,
     'GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]',
     'longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid');
"#;

/// A `gpkg_spatial_ref_sys` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialRef {
    pub srs_id: i64,
    pub srs_name: String,
    pub organization: String,
    pub organization_coordsys_id: i64,
    pub definition: String,
    pub description: Option<String>,
}

/// Double-quote an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Create the core tables (idempotent) and stamp the GeoPackage pragmas.
pub fn init_core(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CORE_SCHEMA)?;
    conn.pragma_update(None, "application_id", APPLICATION_ID)?;
    conn.pragma_update(None, "user_version", USER_VERSION)?;
    Ok(())
}

pub fn has_core_tables(conn: &Connection) -> rusqlite::Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
         ('gpkg_spatial_ref_sys', 'gpkg_contents', 'gpkg_geometry_columns')",
        [],
        |row| row.get(0),
    )?;
    Ok(n == 3)
}

/// Case-insensitive check against every table and view in the file.
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND lower(name) = lower(?1)",
        params![name],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

/// Registered geometry column and srs_id for a feature table, matched
/// case-insensitively.
pub fn geometry_column(conn: &Connection, table: &str) -> rusqlite::Result<Option<(String, i64)>> {
    conn.query_row(
        "SELECT column_name, srs_id FROM gpkg_geometry_columns WHERE lower(table_name) = lower(?1)",
        params![table],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn spatial_ref(conn: &Connection, srs_id: i64) -> rusqlite::Result<Option<SpatialRef>> {
    conn.query_row(
        "SELECT srs_id, srs_name, organization, organization_coordsys_id, definition, description \
         FROM gpkg_spatial_ref_sys WHERE srs_id = ?1",
        params![srs_id],
        |row| {
            Ok(SpatialRef {
                srs_id: row.get(0)?,
                srs_name: row.get(1)?,
                organization: row.get(2)?,
                organization_coordsys_id: row.get(3)?,
                definition: row.get(4)?,
                description: row.get(5)?,
            })
        },
    )
    .optional()
}

/// Register `srs` unless a row with its id already exists.
pub fn insert_spatial_ref(conn: &Connection, srs: &SpatialRef) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO gpkg_spatial_ref_sys \
         (srs_name, srs_id, organization, organization_coordsys_id, definition, description) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            srs.srs_name,
            srs.srs_id,
            srs.organization,
            srs.organization_coordsys_id,
            srs.definition,
            srs.description
        ],
    )?;
    Ok(())
}
