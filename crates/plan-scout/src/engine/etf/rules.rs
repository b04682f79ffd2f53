use lazy_static::lazy_static;
use regex::Regex;

use super::{EtfAssessment, FeeStructure};
use crate::catalog::{ElectricityPlan, EtfSource, EtfStructure};

lazy_static! {
    // "$20 per month remaining", "$20 per remaining month", "$20/month left".
    static ref PER_MONTH_REMAINING_REGEX: Regex = Regex::new(
        r"\$(\d+(?:\.\d+)?)\s*(?:per|/)\s*(?:each\s+)?(?:remaining\s+month|months?\s+(?:remaining|left))"
    )
    .unwrap();
    // "$20 × months remaining", "$20 multiplied by the number of months remaining".
    static ref TIMES_MONTHS_REGEX: Regex = Regex::new(
        r"\$(\d+(?:\.\d+)?)\s*(?:x|×|times|multiplied\s+by)\s*(?:the\s+)?(?:number\s+of\s+)?months?\s+remaining"
    )
    .unwrap();
    // "an early termination fee applies", "cancellation fee may apply".
    static ref FEE_APPLIES_REGEX: Regex =
        Regex::new(r"(?:early\s+)?(?:termination|cancellation)\s+fee\s+(?:may\s+)?appl").unwrap();
}

const NO_FEE_PHRASES: &[&str] = &[
    "no early termination fee",
    "no termination fee",
    "no cancellation fee",
    "no cancel fee",
    "without an early termination fee",
    "$0 early termination",
    "$0 cancellation",
];

const RELOCATION_MARKERS: &[&str] = &["relocat", "if you move", "move out", "moving"];

/// Terms at or above this length are expected to carry a real fee; a small
/// numeric value with no corroborating text cannot be trusted as flat.
const SUSPECT_FLAT_CEILING: f64 = 50.0;
const LONG_TERM_MONTHS: u32 = 12;

pub(super) struct RuleContext<'a> {
    pub(super) plan: &'a ElectricityPlan,
    /// Lowercased concatenation of the plan's free-text fields.
    pub(super) text: String,
}

type EtfRule = fn(&RuleContext<'_>) -> Option<EtfAssessment>;

/// The resolution chain, in order. Each rule applies only when every rule
/// before it produced no answer; the last rule always answers.
pub(super) const RULES: &[(&str, EtfRule)] = &[
    ("structured-detail", structured_detail),
    ("no-fee-text", no_fee_text),
    ("per-month-text", per_month_text),
    ("numeric-fallback", numeric_fallback),
    ("fee-mentioned", fee_mentioned),
    ("absent", absent),
];

/// Structured EFL data wins outright when present.
fn structured_detail(context: &RuleContext<'_>) -> Option<EtfAssessment> {
    let details = context.plan.etf_details.as_ref()?;
    let amount = details.base_amount.or(context.plan.early_termination_fee);
    let assessment = match details.structure {
        EtfStructure::PerMonthRemaining => EtfAssessment {
            structure: FeeStructure::PerMonth,
            per_month_rate: amount,
            flat_amount: None,
            source: details.source,
            rule: "",
        },
        EtfStructure::Flat => EtfAssessment {
            structure: FeeStructure::Flat,
            per_month_rate: None,
            flat_amount: amount,
            source: details.source,
            rule: "",
        },
        EtfStructure::Unknown => EtfAssessment {
            structure: FeeStructure::Unknown,
            per_month_rate: None,
            flat_amount: None,
            source: details.source,
            rule: "",
        },
    };
    Some(assessment)
}

/// Explicit no-fee phrasing, possibly conditioned on relocation.
fn no_fee_text(context: &RuleContext<'_>) -> Option<EtfAssessment> {
    if !NO_FEE_PHRASES
        .iter()
        .any(|phrase| context.text.contains(phrase))
    {
        return None;
    }
    let conditional = RELOCATION_MARKERS
        .iter()
        .any(|marker| context.text.contains(marker));
    Some(EtfAssessment {
        structure: if conditional {
            FeeStructure::NoneConditional
        } else {
            FeeStructure::None
        },
        per_month_rate: None,
        flat_amount: None,
        source: EtfSource::TextParsing,
        rule: "",
    })
}

/// Per-month-remaining phrasing in any of its equivalent forms.
fn per_month_text(context: &RuleContext<'_>) -> Option<EtfAssessment> {
    let rate = PER_MONTH_REMAINING_REGEX
        .captures(&context.text)
        .or_else(|| TIMES_MONTHS_REGEX.captures(&context.text))
        .and_then(|captures| captures[1].parse::<f64>().ok())
        .or_else(|| {
            // A small numeric ETF next to "per month" text is the published
            // multiplier, not the whole fee.
            let value = context.plan.early_termination_fee?;
            let corroborated = context.text.contains("per month")
                || context.text.contains("per remaining month");
            (value > 0.0 && value <= SUSPECT_FLAT_CEILING && corroborated).then_some(value)
        })?;

    Some(EtfAssessment {
        structure: FeeStructure::PerMonth,
        per_month_rate: Some(rate),
        flat_amount: None,
        source: EtfSource::TextParsing,
        rule: "",
    })
}

/// Fall back to the numeric ETF field.
fn numeric_fallback(context: &RuleContext<'_>) -> Option<EtfAssessment> {
    let value = context.plan.early_termination_fee?;

    if context.plan.is_prepaid {
        return Some(flat(value));
    }

    // Small fees on long terms are usually per-month rates published without
    // their multiplier; with no corroborating text the structure cannot be
    // trusted, so it stays unverified rather than guessed.
    if value <= SUSPECT_FLAT_CEILING && context.plan.term_months >= LONG_TERM_MONTHS {
        return Some(EtfAssessment {
            structure: FeeStructure::Unknown,
            per_month_rate: None,
            flat_amount: None,
            source: EtfSource::Legacy,
            rule: "",
        });
    }

    Some(flat(value))
}

fn flat(amount: f64) -> EtfAssessment {
    EtfAssessment {
        structure: FeeStructure::Flat,
        per_month_rate: None,
        flat_amount: Some(amount),
        source: EtfSource::Legacy,
        rule: "",
    }
}

/// Text says a fee applies but never names an amount.
fn fee_mentioned(context: &RuleContext<'_>) -> Option<EtfAssessment> {
    if context.plan.early_termination_fee.is_some() {
        return None;
    }
    if !FEE_APPLIES_REGEX.is_match(&context.text) {
        return None;
    }
    Some(EtfAssessment {
        structure: FeeStructure::Unknown,
        per_month_rate: None,
        flat_amount: None,
        source: EtfSource::TextParsing,
        rule: "",
    })
}

/// No numeric value and no textual signal at all. Short terms genuinely run
/// without a fee; long terms almost never do, so absence of evidence on a
/// long term stays unverified instead of becoming a no-fee claim.
fn absent(context: &RuleContext<'_>) -> Option<EtfAssessment> {
    let structure = if context.plan.term_months >= LONG_TERM_MONTHS {
        FeeStructure::Unknown
    } else {
        FeeStructure::None
    };
    Some(EtfAssessment {
        structure,
        per_month_rate: None,
        flat_amount: None,
        source: EtfSource::Legacy,
        rule: "",
    })
}
