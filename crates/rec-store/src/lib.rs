//! # Recommendation Store Crate
//!
//! Persists the merged output of a generation run as time-stamped,
//! expiring records with per-record interaction state.
//!
//! ## Main Components
//!
//! - **record**: `RecommendationRecord` with its 30-day serving window and
//!   monotonic `InteractionState`
//! - **store**: `RecommendationStore`, an `RwLock`-guarded in-memory store
//!   with an atomic replace-all swap, freshness-filtered reads, and
//!   per-strategy metrics
//! - **error**: Error types for store operations
//!
//! ## Invariants
//!
//! - (learner, offering) is unique among active records
//! - interaction flags transition false to true only; timestamps are set
//!   at most once
//! - a record is served only while active and unexpired

pub mod error;
pub mod record;
pub mod store;

pub use error::{Result, StoreError};
pub use record::{
    InteractionKind, InteractionState, RecommendationRecord, RecordId, RECOMMENDATION_TTL_SECS,
};
pub use store::{RecommendationStore, StrategyMetrics};
