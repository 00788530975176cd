// Selection workbooks, inventory backends, GeoPackage parcel layers and output store

pub mod gpkg;
pub mod inventory;
pub mod parcels;
pub mod selection;
pub mod store;

pub use inventory::{Inventory, InventoryError};
pub use parcels::{GeoPackageLayers, LayerError};
pub use selection::{load_selection, SelectionError};
pub use store::{FeatureClass, FeatureStore, StoreError};
