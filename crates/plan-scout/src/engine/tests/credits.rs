use approx::assert_relative_eq;

use super::fixtures;
use crate::engine::credits::parse_bill_credit;

#[test]
fn range_clause_parses_amount_and_window() {
    let plan = fixtures::credit_gimmick_plan("CRED_1");
    let credit = parse_bill_credit(&plan).expect("range clause parses");
    assert_relative_eq!(credit.amount, 120.0);
    assert_relative_eq!(credit.min_kwh, 1000.0);
    assert_relative_eq!(credit.max_kwh, 1050.0);
    assert_eq!(credit.rule, "range-window");
}

#[test]
fn range_clause_accepts_and_separator() {
    let mut plan = fixtures::simple_fixed_plan("CRED_2");
    plan.fees_credits = Some("$75 bill credit when usage is between 800 and 1200 kWh".to_string());
    let credit = parse_bill_credit(&plan).expect("'and' separator parses");
    assert_relative_eq!(credit.min_kwh, 800.0);
    assert_relative_eq!(credit.max_kwh, 1200.0);
}

#[test]
fn exact_clause_becomes_degenerate_range() {
    let mut plan = fixtures::simple_fixed_plan("CRED_3");
    plan.special_terms = Some("$100 bill credit when usage is exactly 1000 kWh".to_string());
    let credit = parse_bill_credit(&plan).expect("exact clause parses");
    assert_relative_eq!(credit.amount, 100.0);
    assert_relative_eq!(credit.min_kwh, 1000.0);
    assert_relative_eq!(credit.max_kwh, 1000.0);
    assert_eq!(credit.rule, "exact-value");
}

#[test]
fn window_test_rounds_usage_to_whole_kwh() {
    let plan = fixtures::credit_gimmick_plan("CRED_4");
    let credit = parse_bill_credit(&plan).expect("parses");
    assert!(credit.applies_to(999.6));
    assert!(credit.applies_to(1050.4));
    assert!(!credit.applies_to(999.4));
    assert!(!credit.applies_to(1051.0));
    assert_relative_eq!(credit.amount_for_usage(1020.0), 120.0);
    assert_relative_eq!(credit.amount_for_usage(900.0), 0.0);
}

#[test]
fn plans_without_credit_language_yield_none() {
    assert!(parse_bill_credit(&fixtures::simple_fixed_plan("CRED_5")).is_none());

    let mut vague = fixtures::simple_fixed_plan("CRED_6");
    vague.promotion_details = Some("Ask about our loyalty credits!".to_string());
    assert!(parse_bill_credit(&vague).is_none());
}
