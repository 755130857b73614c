//! Core domain types for the offering catalog.
//!
//! This module defines the entities the recommendation engine reads:
//! learners, examinations, and time-boxed opportunities, plus the
//! `OfferingRef` discriminated reference used everywhere an offering of
//! either kind must be addressed uniformly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up learner ids with
// offering ids

/// Unique identifier for a learner
pub type LearnerId = u32;

/// Unique identifier for an offering within its kind
pub type OfferingId = u32;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Current wall-clock time as a unix timestamp
pub fn now_unix() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// =============================================================================
// Offering References
// =============================================================================

/// The two kinds of offerings the engine recommends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingKind {
    Examination,
    Opportunity,
}

impl fmt::Display for OfferingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferingKind::Examination => write!(f, "examination"),
            OfferingKind::Opportunity => write!(f, "opportunity"),
        }
    }
}

impl FromStr for OfferingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "examination" | "exam" => Ok(OfferingKind::Examination),
            "opportunity" => Ok(OfferingKind::Opportunity),
            other => Err(format!("unsupported offering kind: {other}")),
        }
    }
}

/// Discriminated reference to an offering of either kind.
///
/// Scorers and the recommendation store key on this, so it is `Copy`,
/// `Eq`, and `Hash`. The catalog owns the referenced offering; holders of
/// a ref only ever read through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferingRef {
    pub kind: OfferingKind,
    pub id: OfferingId,
}

impl OfferingRef {
    pub fn examination(id: OfferingId) -> Self {
        Self {
            kind: OfferingKind::Examination,
            id,
        }
    }

    pub fn opportunity(id: OfferingId) -> Self {
        Self {
            kind: OfferingKind::Opportunity,
            id,
        }
    }
}

impl fmt::Display for OfferingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

// =============================================================================
// Offerings
// =============================================================================

/// An examination a learner can prepare for and appear in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Examination {
    pub id: OfferingId,
    pub name: String,
    /// Subjects the examination covers (e.g., "Physics")
    pub subjects: Vec<String>,
    /// Broad domain, when one applies (e.g., "Engineering")
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Organizing body, when known
    pub conducted_by: Option<String>,
    /// Pre-tertiary streams the examination is aimed at
    #[serde(default)]
    pub eligible_streams: Vec<String>,
    /// Registration deadline (unix seconds)
    pub deadline: Timestamp,
    /// How many learners have saved or registered for this examination
    pub popularity: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Examination {
    pub fn offering_ref(&self) -> OfferingRef {
        OfferingRef::examination(self.id)
    }
}

/// Category of a time-boxed opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityCategory {
    Hackathon,
    Internship,
}

impl fmt::Display for OpportunityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityCategory::Hackathon => write!(f, "hackathon"),
            OpportunityCategory::Internship => write!(f, "internship"),
        }
    }
}

/// A time-boxed opportunity such as a hackathon or an internship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OfferingId,
    pub title: String,
    pub category: OpportunityCategory,
    /// Skills the opportunity calls for (e.g., "Rust")
    pub skills: Vec<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Hosting company, when known
    pub company: Option<String>,
    /// Degree programs eligible to apply; empty means unrestricted
    #[serde(default)]
    pub eligible_programs: Vec<String>,
    /// Study years eligible to apply; empty means unrestricted
    #[serde(default)]
    pub eligible_years: Vec<u8>,
    /// Application deadline (unix seconds)
    pub deadline: Timestamp,
    /// How many learners have saved or applied to this opportunity
    pub popularity: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Opportunity {
    pub fn offering_ref(&self) -> OfferingRef {
        OfferingRef::opportunity(self.id)
    }
}

fn default_active() -> bool {
    true
}

// =============================================================================
// Learners
// =============================================================================

/// Stage of education, with stage-specific attributes attached to the
/// variant so scorers can pattern-match instead of probing optional fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    PreTertiary {
        /// Declared stream (e.g., "Science"), when the learner has one
        stream: Option<String>,
    },
    Tertiary {
        /// Degree program (e.g., "Computer Science")
        program: Option<String>,
        /// Current study year
        year: Option<u8>,
    },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PreTertiary { .. } => write!(f, "pre-tertiary"),
            Stage::Tertiary { .. } => write!(f, "tertiary"),
        }
    }
}

/// A learner as stored by the (external) profile service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learner {
    pub id: LearnerId,
    pub name: String,
    #[serde(flatten)]
    pub stage: Stage,
    /// Declared interests, free-form (e.g., "Physics", "Machine Learning")
    #[serde(default)]
    pub interests: Vec<String>,
    /// Examinations this learner has saved
    #[serde(default)]
    pub saved_examinations: Vec<OfferingId>,
    /// Opportunities this learner has saved
    #[serde(default)]
    pub saved_opportunities: Vec<OfferingId>,
}

impl Learner {
    /// All saved offerings as discriminated references
    pub fn saved_refs(&self) -> Vec<OfferingRef> {
        self.saved_examinations
            .iter()
            .map(|&id| OfferingRef::examination(id))
            .chain(
                self.saved_opportunities
                    .iter()
                    .map(|&id| OfferingRef::opportunity(id)),
            )
            .collect()
    }
}
