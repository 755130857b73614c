//! Persisted recommendation records.
//!
//! One record exists per (learner, offering) pair among active records.
//! Records are created in bulk by a generation run, read many times,
//! mutated once per interaction kind, and leave service either passively
//! (expiry) or when a newer generation run retires them.

use catalog::{LearnerId, OfferingRef, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strategies::{Reason, StrategyKind};

/// Unique identifier for a recommendation record
pub type RecordId = u64;

/// Serving window for a freshly generated record
pub const RECOMMENDATION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// The interactions a learner can have with a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Viewed,
    Saved,
    Applied,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Viewed => write!(f, "viewed"),
            InteractionKind::Saved => write!(f, "saved"),
            InteractionKind::Applied => write!(f, "applied"),
        }
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewed" => Ok(InteractionKind::Viewed),
            "saved" => Ok(InteractionKind::Saved),
            "applied" => Ok(InteractionKind::Applied),
            other => Err(format!("unsupported interaction kind: {other}")),
        }
    }
}

/// Per-record interaction flags with their first-set timestamps.
///
/// Flags only ever transition false to true and each timestamp is set at
/// most once. Kinds are cumulative but independent: recording `applied`
/// does not imply `saved`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionState {
    pub viewed: bool,
    pub saved: bool,
    pub applied: bool,
    pub viewed_at: Option<Timestamp>,
    pub saved_at: Option<Timestamp>,
    pub applied_at: Option<Timestamp>,
}

impl InteractionState {
    /// Apply one interaction; a repeat of an already-set kind is a no-op
    pub(crate) fn record(&mut self, kind: InteractionKind, now: Timestamp) {
        match kind {
            InteractionKind::Viewed => {
                if !self.viewed {
                    self.viewed = true;
                    self.viewed_at = Some(now);
                }
            }
            InteractionKind::Saved => {
                if !self.saved {
                    self.saved = true;
                    self.saved_at = Some(now);
                }
            }
            InteractionKind::Applied => {
                if !self.applied {
                    self.applied = true;
                    self.applied_at = Some(now);
                }
            }
        }
    }
}

/// A stored recommendation for one learner and one offering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub id: RecordId,
    pub learner_id: LearnerId,
    pub offering: OfferingRef,
    /// Within [0, 1]; generated candidates arrive clamped
    pub score: f32,
    pub strategy: StrategyKind,
    pub reasons: Vec<Reason>,
    pub interaction: InteractionState,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub is_active: bool,
}

impl RecommendationRecord {
    /// Whether the record may be served right now
    pub fn is_servable(&self, now: Timestamp) -> bool {
        self.is_active && now < self.expires_at
    }
}
