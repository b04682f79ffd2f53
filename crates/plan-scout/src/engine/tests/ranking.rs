use std::cmp::Ordering;

use approx::assert_relative_eq;
use chrono::NaiveDate;

use super::fixtures;
use crate::engine::ranking::{comparator, PlanRanker, RankedPlan, WarningKind};
use crate::engine::usage::estimate_usage_pattern;
use crate::error::EngineError;

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

fn ranker() -> PlanRanker {
    PlanRanker::new(Some(fixtures::oncor_tdu()), fixtures::default_tax()).expect("ranker builds")
}

#[test]
fn empty_candidate_list_is_a_fatal_error() {
    let result = ranker().rank(&[], &fixtures::flat_usage(1000.0), reference(), None);
    assert!(matches!(result, Err(EngineError::EmptyPlanList)));
}

#[test]
fn missing_tdu_rate_is_a_fatal_error() {
    let result = PlanRanker::new(None, fixtures::default_tax());
    assert!(matches!(result, Err(EngineError::MissingTduRate)));
}

#[test]
fn non_fixed_plans_score_zero_with_a_recorded_reason() {
    let plans = vec![
        fixtures::simple_fixed_plan("RANK_1"),
        fixtures::variable_plan("RANK_2"),
    ];
    let outcome = ranker()
        .rank(&plans, &fixtures::flat_usage(1000.0), reference(), None)
        .expect("ranking succeeds");

    let variable = outcome
        .plans
        .iter()
        .find(|ranked| ranked.plan.plan_id == "RANK_2")
        .expect("variable plan present");
    assert_relative_eq!(variable.quality_score, 0.0);
    assert!(!variable.score_breakdown.is_empty());
    assert!(variable
        .warnings
        .iter()
        .any(|warning| warning.kind == WarningKind::NonFixedRate));
}

#[test]
fn quality_scores_stay_within_bounds() {
    let plans = vec![
        fixtures::simple_fixed_plan("RANK_3"),
        fixtures::credit_gimmick_plan("RANK_4"),
        fixtures::free_nights_tou_plan("RANK_5"),
        fixtures::variable_plan("RANK_6"),
    ];
    let profile = estimate_usage_pattern(1000.0);
    let outcome = ranker()
        .rank(&plans, &profile, reference(), None)
        .expect("ranking succeeds");

    for ranked in &outcome.plans {
        assert!((0.0..=100.0).contains(&ranked.quality_score));
        assert!((0.0..=1.0).contains(&ranked.volatility));
    }
}

#[test]
fn disqualified_plans_rank_below_every_acceptable_plan() {
    let plans = vec![
        fixtures::simple_fixed_plan("RANK_7"),
        fixtures::free_nights_tou_plan("RANK_8"),
        fixtures::variable_plan("RANK_9"),
    ];
    let outcome = ranker()
        .rank(&plans, &fixtures::flat_usage(1000.0), reference(), None)
        .expect("ranking succeeds");

    assert_eq!(outcome.plans[0].plan.plan_id, "RANK_7");
    for disqualified in &outcome.plans[1..] {
        assert_relative_eq!(disqualified.quality_score, 0.0);
        assert!(disqualified.combined_score < outcome.plans[0].combined_score - 500.0);
    }
}

#[test]
fn credit_gimmick_gets_miss_warnings_with_dollar_impact() {
    let plans = vec![
        fixtures::simple_fixed_plan("RANK_10"),
        fixtures::credit_gimmick_plan("RANK_11"),
    ];
    // A seasonal profile averaging 1000 kWh spends most months outside the
    // narrow 1000-1050 window.
    let profile = estimate_usage_pattern(1000.0);
    let outcome = ranker()
        .rank(&plans, &profile, reference(), None)
        .expect("ranking succeeds");

    let gimmick = outcome
        .plans
        .iter()
        .find(|ranked| ranked.plan.plan_id == "RANK_11")
        .expect("gimmick plan present");

    assert!(gimmick.is_gimmick);
    let miss = gimmick
        .warnings
        .iter()
        .find(|warning| warning.kind == WarningKind::BillCreditMiss)
        .expect("credit miss warning present");
    assert!(miss.message.contains("$120"));
    assert!(gimmick.volatility >= 0.5);
}

#[test]
fn ranking_is_deterministic_across_calls() {
    let plans = vec![
        fixtures::simple_fixed_plan("RANK_12"),
        fixtures::credit_gimmick_plan("RANK_13"),
        fixtures::free_nights_tou_plan("RANK_14"),
        fixtures::simple_fixed_plan_named("RANK_15", "Another Saver 12"),
    ];
    let profile = estimate_usage_pattern(1150.0);

    let first = ranker()
        .rank(&plans, &profile, reference(), None)
        .expect("ranking succeeds");
    let second = ranker()
        .rank(&plans, &profile, reference(), None)
        .expect("ranking succeeds");

    let order = |outcome: &crate::engine::ranking::RankingOutcome| {
        outcome
            .plans
            .iter()
            .map(|ranked| ranked.plan.plan_id.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&first), order(&second));
    assert_eq!(first.plans, second.plans);
}

#[test]
fn order_is_strict_under_the_comparator() {
    let plans = vec![
        fixtures::simple_fixed_plan("RANK_16"),
        fixtures::credit_gimmick_plan("RANK_17"),
        fixtures::free_nights_tou_plan("RANK_18"),
        fixtures::variable_plan("RANK_19"),
        fixtures::simple_fixed_plan_named("RANK_20", "Value Lock 12"),
    ];
    let outcome = ranker()
        .rank(&plans, &estimate_usage_pattern(1000.0), reference(), None)
        .expect("ranking succeeds");

    for pair in outcome.plans.windows(2) {
        assert_eq!(
            comparator::compare(&pair[0], &pair[1]),
            Ordering::Less,
            "ranking must be a strict total order"
        );
    }
}

fn ranked_stub(name: &str, combined: f64, annual: f64, quality: f64) -> RankedPlan {
    RankedPlan {
        plan: fixtures::simple_fixed_plan_named("STUB", name),
        annual_cost: annual,
        average_monthly_cost: annual / 12.0,
        effective_rate: 10.0,
        monthly_costs: [annual / 12.0; 12],
        volatility: 0.0,
        warnings: Vec::new(),
        is_gimmick: false,
        quality_score: quality,
        combined_score: combined,
        score_breakdown: Vec::new(),
    }
}

#[test]
fn comparator_orders_by_combined_score_first() {
    let winner = ranked_stub("A", 90.0, 1500.0, 95.0);
    let loser = ranked_stub("B", 80.0, 1200.0, 95.0);
    assert_eq!(comparator::compare(&winner, &loser), Ordering::Less);
}

#[test]
fn comparator_breaks_near_ties_by_annual_cost() {
    let cheaper = ranked_stub("A", 90.0000, 1200.0, 95.0);
    let pricier = ranked_stub("B", 90.0004, 1500.0, 95.0);
    // Combined scores are within epsilon; the cheaper plan wins.
    assert_eq!(comparator::compare(&cheaper, &pricier), Ordering::Less);
}

#[test]
fn comparator_falls_through_to_quality_then_name() {
    let higher_quality = ranked_stub("A", 90.0, 1200.0, 96.0);
    let lower_quality = ranked_stub("B", 90.0, 1200.004, 92.0);
    assert_eq!(
        comparator::compare(&higher_quality, &lower_quality),
        Ordering::Less
    );

    let alpha = ranked_stub("Alpha Saver", 90.0, 1200.0, 95.0);
    let beta = ranked_stub("Beta Saver", 90.0, 1200.0, 95.0);
    assert_eq!(comparator::compare(&alpha, &beta), Ordering::Less);
    assert_eq!(comparator::compare(&beta, &alpha), Ordering::Greater);
    assert_eq!(comparator::compare(&alpha, &alpha), Ordering::Equal);
}
