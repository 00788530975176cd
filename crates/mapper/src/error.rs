use thiserror::Error;

/// Collaborator failures. Skips and format warnings are not errors; they
/// land in the [`Tally`](crate::Tally).
#[derive(Debug, Error)]
pub enum MapError {
    /// Inventory database connection or query failure.
    #[error("inventory: {0}")]
    Inventory(String),
    /// Parcel layer missing or search failure.
    #[error("parcel layer '{layer}': {message}")]
    Layer { layer: String, message: String },
    /// Output feature insert failure.
    #[error("output store: {0}")]
    Store(String),
}
