use approx::assert_relative_eq;

use super::fixtures;
use crate::catalog::{EtfDetails, EtfSource, EtfStructure};
use crate::engine::etf::{assess, display_info, early_termination_fee, FeeStructure};

#[test]
fn per_month_text_multiplies_by_months_remaining() {
    let mut plan = fixtures::simple_fixed_plan("ETF_1");
    plan.early_termination_fee = None;
    plan.special_terms = Some("Cancellation fee is $20 per month remaining.".to_string());

    let result = early_termination_fee(&plan, 6);
    assert_eq!(result.structure, FeeStructure::PerMonth);
    assert_relative_eq!(result.total, 120.0);
    assert_eq!(result.per_month_rate, Some(20.0));
}

#[test]
fn multiplied_by_phrasing_is_equivalent() {
    let mut plan = fixtures::simple_fixed_plan("ETF_2");
    plan.early_termination_fee = None;
    plan.special_terms =
        Some("$15 multiplied by the number of months remaining on the agreement".to_string());

    let assessment = assess(&plan);
    assert_eq!(assessment.structure, FeeStructure::PerMonth);
    assert_eq!(assessment.per_month_rate, Some(15.0));
    assert_eq!(assessment.rule, "per-month-text");
}

#[test]
fn small_numeric_fee_with_per_month_text_is_the_rate() {
    let mut plan = fixtures::simple_fixed_plan("ETF_3");
    plan.early_termination_fee = Some(25.0);
    plan.special_terms = Some("Early termination charged per month of service left.".to_string());
    // "per month" co-occurring with a numeric <= $50 reads as the multiplier.
    plan.fees_credits = Some("fee assessed per month remaining".to_string());

    let assessment = assess(&plan);
    assert_eq!(assessment.structure, FeeStructure::PerMonth);
    assert_eq!(assessment.per_month_rate, Some(25.0));
}

#[test]
fn explicit_no_fee_text_overrides_the_numeric_field() {
    let mut plan = fixtures::simple_fixed_plan("ETF_4");
    plan.early_termination_fee = Some(50.0);
    plan.special_terms = Some("No early termination fee.".to_string());

    let result = early_termination_fee(&plan, 6);
    assert_eq!(result.structure, FeeStructure::None);
    assert_relative_eq!(result.total, 0.0);
}

#[test]
fn no_fee_conditioned_on_relocation_is_tagged_conditional() {
    let mut plan = fixtures::simple_fixed_plan("ETF_5");
    plan.special_terms =
        Some("No cancellation fee if you move out of the service area.".to_string());

    let assessment = assess(&plan);
    assert_eq!(assessment.structure, FeeStructure::NoneConditional);
    assert_eq!(assessment.rule, "no-fee-text");
}

#[test]
fn zero_fee_on_long_term_stays_unknown() {
    let mut plan = fixtures::simple_fixed_plan("ETF_6");
    plan.early_termination_fee = Some(0.0);
    plan.special_terms = Some(String::new());
    plan.term_months = 24;

    let result = early_termination_fee(&plan, 12);
    assert_eq!(result.structure, FeeStructure::Unknown);
    assert_relative_eq!(result.total, 0.0);
}

#[test]
fn small_fee_on_long_term_without_corroboration_stays_unknown() {
    let mut plan = fixtures::simple_fixed_plan("ETF_7");
    plan.early_termination_fee = Some(45.0);

    let assessment = assess(&plan);
    assert_eq!(assessment.structure, FeeStructure::Unknown);
    assert_eq!(assessment.rule, "numeric-fallback");
}

#[test]
fn prepaid_numeric_fee_is_always_flat() {
    let mut plan = fixtures::simple_fixed_plan("ETF_8");
    plan.is_prepaid = true;
    plan.early_termination_fee = Some(45.0);

    let result = early_termination_fee(&plan, 6);
    assert_eq!(result.structure, FeeStructure::Flat);
    assert_relative_eq!(result.total, 45.0);
}

#[test]
fn ordinary_numeric_fee_is_flat() {
    let plan = fixtures::simple_fixed_plan("ETF_9");
    let result = early_termination_fee(&plan, 3);
    assert_eq!(result.structure, FeeStructure::Flat);
    assert_relative_eq!(result.total, 150.0);
}

#[test]
fn structured_details_win_over_every_text_rule() {
    let mut plan = fixtures::simple_fixed_plan("ETF_10");
    plan.special_terms = Some("No early termination fee.".to_string());
    plan.etf_details = Some(EtfDetails {
        structure: EtfStructure::PerMonthRemaining,
        base_amount: Some(25.0),
        source: EtfSource::Efl,
    });

    let result = early_termination_fee(&plan, 4);
    assert_eq!(result.structure, FeeStructure::PerMonth);
    assert_relative_eq!(result.total, 100.0);
    assert_eq!(assess(&plan).rule, "structured-detail");
}

#[test]
fn fee_mention_without_amount_is_unknown() {
    let mut plan = fixtures::simple_fixed_plan("ETF_11");
    plan.early_termination_fee = None;
    plan.special_terms = Some("An early termination fee may apply.".to_string());

    let assessment = assess(&plan);
    assert_eq!(assessment.structure, FeeStructure::Unknown);
    assert_eq!(assessment.rule, "fee-mentioned");
}

#[test]
fn absent_evidence_is_none_only_on_short_terms() {
    let mut plan = fixtures::simple_fixed_plan("ETF_12");
    plan.early_termination_fee = None;
    plan.special_terms = None;

    plan.term_months = 6;
    assert_eq!(assess(&plan).structure, FeeStructure::None);

    plan.term_months = 24;
    assert_eq!(assess(&plan).structure, FeeStructure::Unknown);
}

#[test]
fn display_flags_unverified_structures_for_confirmation() {
    // Flat from the numeric field: trusted.
    let flat = fixtures::simple_fixed_plan("ETF_13");
    assert!(!display_info(&flat).needs_confirmation);

    // Per-month inferred from text: verify against the EFL.
    let mut inferred = fixtures::simple_fixed_plan("ETF_14");
    inferred.early_termination_fee = None;
    inferred.special_terms = Some("Cancellation fee is $20 per month remaining.".to_string());
    let display = display_info(&inferred);
    assert!(display.needs_confirmation);
    assert_eq!(display.label, "$20 per month remaining");

    // Per-month from structured EFL data: trusted.
    let mut structured = fixtures::simple_fixed_plan("ETF_15");
    structured.etf_details = Some(EtfDetails {
        structure: EtfStructure::PerMonthRemaining,
        base_amount: Some(20.0),
        source: EtfSource::Efl,
    });
    assert!(!display_info(&structured).needs_confirmation);

    // Unknown always asks for confirmation.
    let mut unknown = fixtures::simple_fixed_plan("ETF_16");
    unknown.early_termination_fee = Some(0.0);
    unknown.term_months = 24;
    assert!(display_info(&unknown).needs_confirmation);
}
