//! Contract-renewal seasonality.
//!
//! Plans that expire in July, August, or deep winter force the household to
//! shop for a replacement when market prices peak. The analyzer scores the
//! expiration month and suggests nearby terms that land in a better window.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// Renewal risk per expiration calendar month, index 0 = January.
/// 0.0 is the best shopping window (April, October), 1.0 the worst.
pub const RENEWAL_SEASONALITY: [f64; 12] = [
    0.9, 0.6, 0.2, 0.0, 0.3, 0.7, 1.0, 1.0, 0.5, 0.0, 0.2, 0.8,
];

const CANDIDATE_TERMS: [u32; 8] = [3, 6, 9, 12, 15, 18, 24, 36];
const MAX_SUGGESTIONS: usize = 3;
const NEAR_ZERO_SCORE: f64 = 0.05;
const RELATIVE_IMPROVEMENT_FLOOR: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenewalRisk {
    Optimal,
    Low,
    Medium,
    High,
}

impl RenewalRisk {
    pub fn label(&self) -> &'static str {
        match self {
            RenewalRisk::Optimal => "optimal",
            RenewalRisk::Low => "low",
            RenewalRisk::Medium => "medium",
            RenewalRisk::High => "high",
        }
    }

    fn for_score(score: f64) -> Self {
        if score >= 0.8 {
            RenewalRisk::High
        } else if score >= 0.5 {
            RenewalRisk::Medium
        } else if score >= 0.2 {
            RenewalRisk::Low
        } else {
            RenewalRisk::Optimal
        }
    }
}

/// An alternative contract length with a better renewal window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermSuggestion {
    pub term_months: u32,
    pub expiration_month: u32,
    pub seasonality_score: f64,
}

/// Where and how risky a contract's expiration lands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpirationOutlook {
    pub expiration_date: NaiveDate,
    /// Calendar month of expiration, 1-12.
    pub expiration_month: u32,
    pub seasonality_score: f64,
    pub risk: RenewalRisk,
    pub alternative_terms: Vec<TermSuggestion>,
}

/// Compute the expiration outlook for a contract.
///
/// A missing start date defaults to the reference date; a zero-month term
/// defaults to 12.
pub fn contract_expiration(
    start: Option<NaiveDate>,
    term_months: u32,
    reference: NaiveDate,
) -> ExpirationOutlook {
    let start = start.unwrap_or(reference);
    let term = if term_months == 0 { 12 } else { term_months };

    let expiration_date = add_months(start, term);
    let expiration_month = expiration_date.month();
    let seasonality_score = score_for_month(expiration_month);

    let mut alternatives: Vec<TermSuggestion> = CANDIDATE_TERMS
        .iter()
        .filter(|candidate| **candidate != term)
        .map(|candidate| {
            let candidate_date = add_months(start, *candidate);
            TermSuggestion {
                term_months: *candidate,
                expiration_month: candidate_date.month(),
                seasonality_score: score_for_month(candidate_date.month()),
            }
        })
        .filter(|suggestion| {
            let improved = seasonality_score > 0.0
                && (seasonality_score - suggestion.seasonality_score) / seasonality_score
                    >= RELATIVE_IMPROVEMENT_FLOOR;
            let near_zero = suggestion.seasonality_score <= NEAR_ZERO_SCORE
                && seasonality_score > NEAR_ZERO_SCORE;
            improved || near_zero
        })
        .collect();

    alternatives.sort_by(|a, b| {
        a.seasonality_score
            .total_cmp(&b.seasonality_score)
            .then(a.term_months.cmp(&b.term_months))
    });
    alternatives.truncate(MAX_SUGGESTIONS);

    ExpirationOutlook {
        expiration_date,
        expiration_month,
        seasonality_score,
        risk: RenewalRisk::for_score(seasonality_score),
        alternative_terms: alternatives,
    }
}

fn score_for_month(month: u32) -> f64 {
    RENEWAL_SEASONALITY[(month as usize - 1) % 12]
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}
