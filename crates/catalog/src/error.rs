//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while loading or querying the offering catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Seed file could not be found or opened
    #[error("failed to open seed file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a seed file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file contained malformed JSON
    #[error("malformed seed file {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A seed record referenced an entity that does not exist
    /// (e.g., a learner's saved offering id with no matching offering)
    #[error("dangling reference: {entity} with id {id}")]
    DanglingReference { entity: String, id: u32 },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, CatalogError>;
