//! Fingerprint-based deduplication.
//!
//! Power to Choose lists most offers twice, as an English and a Spanish
//! variant of the same substantive terms. Plans collapse by the numeric
//! fingerprint; within a group the language-preference score picks the
//! surviving representative.

mod fingerprint;
mod language;

use std::collections::BTreeSet;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

pub use fingerprint::{fingerprint, normalize_provider, Fingerprint};
pub use language::{language_of, preference_score, Language};

use crate::catalog::ElectricityPlan;

/// Counters describing what deduplication found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeduplicationSummary {
    pub original_count: usize,
    pub duplicate_count: usize,
    /// Single-language groups that only appeared in English.
    pub orphaned_english_count: usize,
    /// Single-language groups that only appeared in Spanish.
    pub orphaned_spanish_count: usize,
}

/// Collapse duplicate listings, keeping one representative per fingerprint.
///
/// Survivors come back in first-seen order, so the operation is idempotent:
/// running it again removes nothing further.
pub fn deduplicate(plans: &[ElectricityPlan]) -> (Vec<ElectricityPlan>, DeduplicationSummary) {
    let mut group_order: Vec<Fingerprint> = Vec::new();
    let mut groups: HashMap<Fingerprint, Vec<&ElectricityPlan>> = HashMap::new();

    for plan in plans {
        let key = fingerprint(plan);
        let members = groups.entry(key.clone()).or_default();
        if members.is_empty() {
            group_order.push(key);
        }
        members.push(plan);
    }

    let mut survivors = Vec::with_capacity(group_order.len());
    let mut orphaned_english = 0;
    let mut orphaned_spanish = 0;

    for key in &group_order {
        let members = &groups[key];

        let languages: BTreeSet<Language> =
            members.iter().map(|plan| language_of(plan)).collect();
        if languages.len() == 1 {
            match languages.iter().next() {
                Some(Language::English) => orphaned_english += 1,
                Some(Language::Spanish) => orphaned_spanish += 1,
                None => {}
            }
        }

        let mut candidates: Vec<&ElectricityPlan> = members.clone();
        candidates.sort_by(|a, b| {
            preference_score(b)
                .cmp(&preference_score(a))
                .then_with(|| a.plan_id.cmp(&b.plan_id))
        });
        if let Some(survivor) = candidates.first() {
            survivors.push((*survivor).clone());
        }
    }

    let summary = DeduplicationSummary {
        original_count: plans.len(),
        duplicate_count: plans.len() - survivors.len(),
        orphaned_english_count: orphaned_english,
        orphaned_spanish_count: orphaned_spanish,
    };
    debug!(
        original = summary.original_count,
        duplicates = summary.duplicate_count,
        "deduplicated plan list"
    );

    (survivors, summary)
}
