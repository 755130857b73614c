//! Core trait for scoring strategies.
//!
//! Strategies are interchangeable: the service holds an injected, ordered
//! list of `Arc<dyn Strategy>` and fans them out per generation run. New
//! algorithms are added by implementing this trait, not by extending a
//! dispatch table.

use crate::profile::Profile;
use crate::types::{CandidatePool, ScoredCandidate, StrategyKind};
use anyhow::Result;

/// A scoring algorithm that ranks candidate offerings against a profile.
///
/// ## Design Note
/// - `Send + Sync` so strategies can run concurrently on blocking threads
/// - Strategies only read: the profile and pool are shared snapshots, and
///   any catalog access goes through an `Arc<CatalogIndex>` they own
/// - An empty result is a normal outcome (cold start, no neighbors), not
///   an error; `Err` is reserved for upstream lookup failures
pub trait Strategy: Send + Sync {
    /// Returns the name of this strategy (for logging/debugging)
    fn name(&self) -> &'static str;

    /// The tag stamped on every candidate this strategy emits
    fn kind(&self) -> StrategyKind;

    /// Score the candidate pool against a profile.
    ///
    /// # Returns
    /// * `Ok(Vec<ScoredCandidate>)` - candidates worth recommending, best first
    /// * `Err` - if an upstream lookup failed
    fn score(&self, profile: &Profile, pool: &CandidatePool) -> Result<Vec<ScoredCandidate>>;
}
