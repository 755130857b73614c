//! Ranking crate: combines strategy outputs into the final served order.
//!
//! - [`HybridMerger`] deduplicates and re-ranks the fan-out results
//! - [`trending`] is the profile-independent popularity view

pub mod merger;
pub mod trending;

pub use merger::HybridMerger;
pub use trending::{trending, TrendingOffering};
