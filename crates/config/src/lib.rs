// Configuration loading

pub mod env;
pub mod error;
pub mod settings;

pub use env::{operator_name, InventoryConnection};
pub use error::ConfigError;
pub use settings::{InventoryBackend, Settings};
