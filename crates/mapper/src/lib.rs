//! `parcelmap-mapper` - maps a saved selection to parcel polygons.
//!
//! Pure engine crate: talks to the inventory, the parcel layers and the
//! output store only through the traits in [`source`]. No CLI or IO
//! dependencies.

pub mod engine;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod source;
pub mod tally;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{run, RunOptions};
pub use error::MapError;
pub use source::{FeatureSink, InventorySource, ParcelLayers};
pub use tally::Tally;
pub use writer::Provenance;
