//! # Catalog Crate
//!
//! This crate holds the domain types and the in-memory catalog the
//! recommendation engine reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Learner, Examination, Opportunity,
//!   OfferingRef)
//! - **index**: `CatalogIndex`, the read interface standing in for the
//!   external catalog and learner-directory collaborators
//! - **loader**: Parse JSON seed files into a catalog
//! - **error**: Error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{load_catalog, now_unix};
//! use std::path::Path;
//!
//! let catalog = load_catalog(Path::new("data"))?;
//! let learner = catalog.learner(1).unwrap();
//! let exams = catalog.active_examinations(now_unix(), 200);
//!
//! println!("{} has {} exams to consider", learner.name, exams.len());
//! ```

// Public modules
pub mod error;
pub mod index;
pub mod loader;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use index::CatalogIndex;
pub use loader::load_catalog;
pub use types::{
    now_unix,
    // Type aliases
    LearnerId,
    OfferingId,
    Timestamp,
    // Core types
    Examination,
    Learner,
    Opportunity,
    // Enums
    OfferingKind,
    OfferingRef,
    OpportunityCategory,
    Stage,
};
