//! Profile-independent trending query.
//!
//! Ranks currently active offerings by raw popularity, most popular
//! first, with the nearer deadline breaking ties. No scorer is involved:
//! this is the collaborator-facing "what is everyone looking at" view.

use catalog::{CatalogIndex, OfferingKind, OfferingRef, Timestamp};
use serde::Serialize;

/// One entry in the trending list
#[derive(Debug, Clone, Serialize)]
pub struct TrendingOffering {
    pub offering: OfferingRef,
    pub name: String,
    pub popularity: u32,
    pub deadline: Timestamp,
}

/// Most popular active, unexpired offerings, optionally restricted to one
/// kind
pub fn trending(
    catalog: &CatalogIndex,
    kind: Option<OfferingKind>,
    limit: usize,
    now: Timestamp,
) -> Vec<TrendingOffering> {
    let mut entries: Vec<TrendingOffering> = Vec::new();

    if kind.is_none() || kind == Some(OfferingKind::Examination) {
        entries.extend(catalog.active_examinations(now, usize::MAX).into_iter().map(
            |exam| TrendingOffering {
                offering: exam.offering_ref(),
                name: exam.name,
                popularity: exam.popularity,
                deadline: exam.deadline,
            },
        ));
    }
    if kind.is_none() || kind == Some(OfferingKind::Opportunity) {
        entries.extend(catalog.active_opportunities(now, usize::MAX).into_iter().map(
            |opportunity| TrendingOffering {
                offering: opportunity.offering_ref(),
                name: opportunity.title,
                popularity: opportunity.popularity,
                deadline: opportunity.deadline,
            },
        ));
    }

    entries.sort_by(|a, b| {
        b.popularity
            .cmp(&a.popularity)
            .then_with(|| a.deadline.cmp(&b.deadline))
            .then_with(|| a.offering.cmp(&b.offering))
    });
    entries.truncate(limit);
    entries
}
