use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// County code outside the supported table.
    #[error("unsupported county code: {0}")]
    UnknownCounty(i64),
    /// An APN pattern override that does not compile.
    #[error("county {county}: invalid APN pattern '{pattern}': {source}")]
    InvalidPattern {
        county: u8,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
