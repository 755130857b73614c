//! Error types for the recommendation store.

use crate::record::RecordId;
use thiserror::Error;

/// Errors that can occur on store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The record id does not exist or the record is no longer active
    #[error("recommendation record {0} not found or inactive")]
    NotFound(RecordId),

    /// A lock guarding the store was poisoned by a panicking writer
    #[error("recommendation store lock poisoned")]
    Poisoned,
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, StoreError>;
