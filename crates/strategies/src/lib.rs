//! # Strategies Crate
//!
//! This crate implements the interchangeable scoring strategies of the
//! recommendation engine.
//!
//! ## Components
//!
//! ### Profile Extraction
//! Normalizes a learner snapshot into the [`Profile`] every strategy
//! scores against. Pure and infallible; empty signal means empty sets.
//!
//! ### Rule-Based Strategy
//! Additive heuristics over stage alignment, interest overlap, and
//! popularity, with a strict emit threshold.
//!
//! ### Content-Based Strategy
//! Facet similarity between unseen candidates and what the learner has
//! already saved.
//!
//! ### Collaborative Strategy
//! Co-occurrence of saved offerings among learners with overlapping
//! interests.
//!
//! ## Example Usage
//!
//! ```ignore
//! use strategies::{extract_profile, CandidatePool, RuleBasedStrategy, Strategy};
//! use std::sync::Arc;
//!
//! let profile = extract_profile(catalog.learner(1).unwrap());
//! let pool = CandidatePool {
//!     examinations: catalog.active_examinations(now, 200),
//!     opportunities: catalog.active_opportunities(now, 200),
//! };
//!
//! let rule_based = RuleBasedStrategy::new();
//! let scored = rule_based.score(&profile, &pool)?;
//! ```

// Public modules
pub mod collaborative;
pub mod content_based;
pub mod profile;
pub mod rule_based;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use collaborative::CollaborativeStrategy;
pub use content_based::{ContentBasedStrategy, FacetWeights};
pub use profile::{extract_profile, Profile};
pub use rule_based::{RuleBasedStrategy, RuleWeights};
pub use traits::Strategy;
pub use types::{CandidatePool, Reason, ScoredCandidate, StrategyKind};
