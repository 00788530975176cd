//! `parcelmap-core` - domain types shared by every other crate.
//!
//! County registry, APN normalization and format patterns, selection
//! entries, inventory parent records, parcel matches and output features.
//! No IO.

pub mod apn;
pub mod county;
pub mod error;
pub mod feature;
pub mod naming;
pub mod record;
pub mod selection;

pub use apn::{distinct_apns, Apn, ApnPatterns};
pub use county::{County, CountyCode, LayerNames, COUNTIES};
pub use error::CoreError;
pub use feature::{FeatureIdent, Geometry, OutputFeature, ParcelMatch};
pub use record::ParentRecord;
pub use selection::{Selection, SelectionEntry, SelectionKind};
