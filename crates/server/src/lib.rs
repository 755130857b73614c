//! Server crate for the EduRecs recommendation engine.
//!
//! This crate contains the service that coordinates profile extraction,
//! the strategy fan-out, merging, and the recommendation store.

pub mod error;
pub mod service;

pub use error::ServiceError;
pub use service::{RecommendationService, ServiceConfig};
