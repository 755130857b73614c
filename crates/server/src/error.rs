//! Service-level error taxonomy.
//!
//! `NotFound` and `InvalidArgument` surface to the caller immediately
//! with no retry. Upstream trouble inside a generation run is absorbed
//! per strategy and never reaches this type; the `Upstream` variant
//! exists for consumed-interface failures outside that absorption path.

use catalog::LearnerId;
use rec_store::{RecordId, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Unknown learner id
    #[error("learner {0} not found")]
    LearnerNotFound(LearnerId),

    /// Unknown or retired recommendation record
    #[error("recommendation record {0} not found")]
    RecordNotFound(RecordId),

    /// Malformed limit, unsupported kind, or other bad caller input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A consumed collaborator interface failed or timed out
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// Store write failure or other internal fault
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::RecordNotFound(id),
            StoreError::Poisoned => ServiceError::Internal(err.to_string()),
        }
    }
}
