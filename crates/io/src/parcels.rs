// County parcel layers in a GeoPackage basemap

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use thiserror::Error;
use tracing::debug;

use parcelmap_core::{Apn, CountyCode, Geometry, LayerNames};
use parcelmap_mapper::{MapError, ParcelLayers};

use crate::gpkg::{self, SpatialRef};

/// Geometry column used when a layer is not registered.
const DEFAULT_GEOMETRY_COLUMN: &str = "geom";

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("cannot open parcel basemap {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{} is not a GeoPackage (no gpkg metadata tables)", .0.display())]
    NotGeoPackage(PathBuf),
    #[error("parcel layers use different spatial references: {}", .0.join(", "))]
    MixedSpatialRefs(Vec<String>),
    #[error("parcel basemap: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Read-only view of the basemap. Geometry columns are looked up once per
/// layer and cached.
pub struct GeoPackageLayers {
    conn: Connection,
    path: PathBuf,
    columns: HashMap<String, String>,
}

impl GeoPackageLayers {
    pub fn open(path: &Path) -> Result<Self, LayerError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| LayerError::Open { path: path.to_path_buf(), source })?;
        if !gpkg::has_core_tables(&conn)? {
            return Err(LayerError::NotGeoPackage(path.to_path_buf()));
        }
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            columns: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_layer(&self, layer: &str) -> Result<bool, LayerError> {
        Ok(gpkg::table_exists(&self.conn, layer)?)
    }

    /// Spatial reference shared by every county layer that registers a
    /// defined one. `None` when no layer does.
    ///
    /// Polygons are copied without reprojection, so layers on different
    /// references are rejected rather than written under the wrong one.
    pub fn spatial_ref(&self, names: &LayerNames) -> Result<Option<SpatialRef>, LayerError> {
        let mut by_srs: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for county in CountyCode::all() {
            let layer = names.layer(county);
            let Some((_, srs_id)) = gpkg::geometry_column(&self.conn, layer)? else {
                continue;
            };
            if srs_id <= 0 {
                continue;
            }
            let layers = by_srs.entry(srs_id).or_default();
            if !layers.iter().any(|l| l == layer) {
                layers.push(layer.to_string());
            }
        }

        if by_srs.len() > 1 {
            let conflicts = by_srs
                .iter()
                .flat_map(|(srs_id, layers)| layers.iter().map(move |l| format!("{l} ({srs_id})")))
                .collect();
            return Err(LayerError::MixedSpatialRefs(conflicts));
        }
        match by_srs.keys().next() {
            Some(srs_id) => Ok(gpkg::spatial_ref(&self.conn, *srs_id)?),
            None => Ok(None),
        }
    }

    fn geometry_column(&mut self, layer: &str) -> Result<String, MapError> {
        if let Some(col) = self.columns.get(layer) {
            return Ok(col.clone());
        }

        let exists = gpkg::table_exists(&self.conn, layer).map_err(|e| layer_err(layer, e))?;
        if !exists {
            return Err(MapError::Layer {
                layer: layer.to_string(),
                message: format!("not found in {}", self.path.display()),
            });
        }

        let col = gpkg::geometry_column(&self.conn, layer)
            .map_err(|e| layer_err(layer, e))?
            .map(|(name, _)| name)
            .unwrap_or_else(|| DEFAULT_GEOMETRY_COLUMN.to_string());
        debug!(layer, column = %col, "geometry column");
        self.columns.insert(layer.to_string(), col.clone());
        Ok(col)
    }
}

fn layer_err(layer: &str, e: rusqlite::Error) -> MapError {
    MapError::Layer {
        layer: layer.to_string(),
        message: e.to_string(),
    }
}

impl ParcelLayers for GeoPackageLayers {
    /// A GeoPackage carries no persistent selection; nothing to clear.
    fn clear_selection(&mut self, layer: &str) -> Result<(), MapError> {
        debug!(layer, "selection cleared");
        Ok(())
    }

    fn search(&mut self, layer: &str, apn: &Apn) -> Result<Vec<Geometry>, MapError> {
        let column = self.geometry_column(layer)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE \"APN\" = ?1",
            gpkg::quote_ident(&column),
            gpkg::quote_ident(layer)
        );
        debug!(%sql, apn = apn.as_str(), "parcel search");

        let mut stmt = self.conn.prepare_cached(&sql).map_err(|e| layer_err(layer, e))?;
        let rows = stmt
            .query_map(params![apn.as_str()], |row| row.get::<_, Option<Vec<u8>>>(0))
            .map_err(|e| layer_err(layer, e))?;

        let mut out = Vec::new();
        for blob in rows {
            match blob.map_err(|e| layer_err(layer, e))? {
                Some(bytes) => out.push(Geometry(bytes)),
                None => debug!(layer, apn = apn.as_str(), "parcel row without geometry skipped"),
            }
        }
        Ok(out)
    }
}
