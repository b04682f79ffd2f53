//! Early-termination-fee structure inference.
//!
//! Fee language is the noisiest field in the upstream data. Resolution is an
//! ordered chain of named rules (see [`rules`]); the first rule with an
//! answer wins, and ambiguity is the explicit `Unknown` structure rather
//! than a guess or an error.

mod rules;

use serde::Serialize;

use crate::catalog::{ElectricityPlan, EtfSource};
use rules::RuleContext;

/// Resolved fee structure for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeeStructure {
    Flat,
    PerMonth,
    Unknown,
    None,
    /// No fee, but only when the customer moves out of the service area.
    NoneConditional,
}

/// Outcome of the rule chain for one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EtfAssessment {
    pub structure: FeeStructure,
    pub per_month_rate: Option<f64>,
    pub flat_amount: Option<f64>,
    pub source: EtfSource,
    /// Name of the rule that produced this answer.
    pub rule: &'static str,
}

/// The fee owed for cancelling with a given number of months left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EtfResult {
    pub total: f64,
    pub structure: FeeStructure,
    pub per_month_rate: Option<f64>,
    pub months_remaining: u32,
}

/// Short label plus a verification flag for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EtfDisplay {
    pub label: String,
    /// Set when the structure is unverified (`Unknown`, or per-month
    /// inferred from text rather than structured EFL data). The consumer
    /// decides how to prompt; the engine only computes the flag.
    pub needs_confirmation: bool,
}

/// Run the rule chain over a plan.
pub fn assess(plan: &ElectricityPlan) -> EtfAssessment {
    let context = RuleContext {
        plan,
        text: plan.free_text(),
    };
    for (name, rule) in rules::RULES.iter().copied() {
        if let Some(mut assessment) = rule(&context) {
            assessment.rule = name;
            return assessment;
        }
    }
    // The final `absent` rule always answers; this is unreachable.
    EtfAssessment {
        structure: FeeStructure::None,
        per_month_rate: None,
        flat_amount: None,
        source: EtfSource::Legacy,
        rule: "absent",
    }
}

/// The dollar fee owed at `months_remaining` months before contract end.
pub fn early_termination_fee(plan: &ElectricityPlan, months_remaining: u32) -> EtfResult {
    let assessment = assess(plan);
    let total = match assessment.structure {
        FeeStructure::PerMonth => {
            assessment.per_month_rate.unwrap_or(0.0) * f64::from(months_remaining)
        }
        FeeStructure::Flat => assessment.flat_amount.unwrap_or(0.0),
        FeeStructure::Unknown | FeeStructure::None | FeeStructure::NoneConditional => 0.0,
    };
    EtfResult {
        total,
        structure: assessment.structure,
        per_month_rate: assessment.per_month_rate,
        months_remaining,
    }
}

/// Human-readable fee summary plus the manual-verification flag.
pub fn display_info(plan: &ElectricityPlan) -> EtfDisplay {
    let assessment = assess(plan);
    let label = match assessment.structure {
        FeeStructure::Flat => match assessment.flat_amount {
            Some(amount) => format!("${amount:.0} flat cancellation fee"),
            None => "flat cancellation fee".to_string(),
        },
        FeeStructure::PerMonth => match assessment.per_month_rate {
            Some(rate) => format!("${rate:.0} per month remaining"),
            None => "per-month cancellation fee".to_string(),
        },
        FeeStructure::Unknown => "cancellation fee structure unverified".to_string(),
        FeeStructure::None => "no cancellation fee".to_string(),
        FeeStructure::NoneConditional => "cancellation fee waived if you move".to_string(),
    };
    let needs_confirmation = assessment.structure == FeeStructure::Unknown
        || (assessment.structure == FeeStructure::PerMonth
            && assessment.source == EtfSource::TextParsing);
    EtfDisplay {
        label,
        needs_confirmation,
    }
}
