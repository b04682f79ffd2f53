//! The ranking pipeline: compose costing, fee inference, renewal analysis,
//! and deduplication into a deterministically ordered, quality-scored plan
//! list.

pub mod comparator;
mod volatility;
mod warnings;

pub use warnings::{Warning, WarningKind};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::catalog::{ElectricityPlan, RateType, TaxInfo, TduRate};
use crate::engine::costing::{self, AnnualCost};
use crate::engine::credits::{self, BillCredit};
use crate::engine::dedup::{self, DeduplicationSummary};
use crate::engine::renewal::{self, ExpirationOutlook, RenewalRisk};
use crate::engine::usage::UsageProfile;
use crate::error::EngineError;

const ACCEPTABLE_QUALITY_FLOOR: f64 = 60.0;
const GOOD_QUALITY_FLOOR: f64 = 70.0;
const SUB_ACCEPTABLE_OFFSET: f64 = 1000.0;
const MARGINAL_QUALITY_PENALTY: f64 = 10.0;
const MAX_COST_PENALTY: f64 = 40.0;
const MAX_VOLATILITY_PENALTY: f64 = 25.0;
const WARNING_PENALTY_EACH: f64 = 5.0;
const MAX_WARNING_PENALTY: f64 = 25.0;
const BASE_CHARGE_FLOOR: f64 = 15.0;
const MAX_BASE_CHARGE_PENALTY: f64 = 5.0;
const HIGH_RISK_PENALTY: f64 = 30.0;
const MEDIUM_RISK_PENALTY: f64 = 15.0;
const GIMMICK_SPREAD_FLOOR: f64 = 0.5;

/// Factors that can move the quality score, for transparent audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreFactor {
    RateType,
    Prepaid,
    TimeOfUse,
    CostAboveBest,
    Volatility,
    Warnings,
    BaseCharge,
    RenewalTiming,
}

/// Discrete contribution to the quality score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: f64,
    pub notes: String,
}

/// A plan with every computed evaluation attached. Built fresh per ranking
/// call; the underlying plan record is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlan {
    pub plan: ElectricityPlan,
    pub annual_cost: f64,
    pub average_monthly_cost: f64,
    pub effective_rate: f64,
    pub monthly_costs: [f64; 12],
    pub volatility: f64,
    pub warnings: Vec<Warning>,
    pub is_gimmick: bool,
    pub quality_score: f64,
    pub combined_score: f64,
    pub score_breakdown: Vec<ScoreComponent>,
}

/// Ordered result of a ranking call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingOutcome {
    pub plans: Vec<RankedPlan>,
    pub dedup: DeduplicationSummary,
}

/// Stateless orchestrator holding the resolved reference records.
pub struct PlanRanker {
    tdu: TduRate,
    tax: TaxInfo,
}

impl PlanRanker {
    /// Build a ranker for a service area. A missing TDU record is a fatal
    /// input error, not an empty result.
    pub fn new(tdu: Option<TduRate>, tax: TaxInfo) -> Result<Self, EngineError> {
        let tdu = tdu.ok_or(EngineError::MissingTduRate)?;
        Ok(Self { tdu, tax })
    }

    pub fn tdu(&self) -> &TduRate {
        &self.tdu
    }

    pub fn tax(&self) -> &TaxInfo {
        &self.tax
    }

    /// Deduplicate, evaluate, score, and order a candidate plan list.
    ///
    /// Pure with respect to its arguments: the same inputs always produce
    /// the same output, byte for byte.
    pub fn rank(
        &self,
        plans: &[ElectricityPlan],
        profile: &UsageProfile,
        reference: NaiveDate,
        contract_start: Option<NaiveDate>,
    ) -> Result<RankingOutcome, EngineError> {
        if plans.is_empty() {
            return Err(EngineError::EmptyPlanList);
        }

        let (survivors, dedup_summary) = dedup::deduplicate(plans);

        let prepared: Vec<Prepared> = survivors
            .into_iter()
            .map(|plan| {
                let credit = credits::parse_bill_credit(&plan);
                let annual = costing::annual_cost(&plan, profile, &self.tdu, self.tax.rate);
                let outlook =
                    renewal::contract_expiration(contract_start, plan.term_months, reference);
                Prepared {
                    plan,
                    credit,
                    annual,
                    outlook,
                }
            })
            .collect();

        let best_cost = fold_costs(&prepared, f64::min);
        let worst_cost = fold_costs(&prepared, f64::max);
        let cheapest_fixed = prepared
            .iter()
            .filter(|candidate| candidate.plan.rate_type == RateType::Fixed)
            .map(|candidate| candidate.annual.total)
            .fold(None, |acc: Option<f64>, cost| {
                Some(acc.map_or(cost, |current| current.min(cost)))
            });

        let mut ranked: Vec<RankedPlan> = prepared
            .into_iter()
            .map(|candidate| self.evaluate(candidate, profile, best_cost, worst_cost, cheapest_fixed))
            .collect();

        ranked.sort_by(comparator::compare);

        debug!(
            candidates = plans.len(),
            ranked = ranked.len(),
            "ranking complete"
        );

        Ok(RankingOutcome {
            plans: ranked,
            dedup: dedup_summary,
        })
    }

    fn evaluate(
        &self,
        candidate: Prepared,
        profile: &UsageProfile,
        best_cost: f64,
        worst_cost: f64,
        cheapest_fixed: Option<f64>,
    ) -> RankedPlan {
        let Prepared {
            plan,
            credit,
            annual,
            outlook,
        } = candidate;

        let volatility = volatility::volatility_score(&plan, profile, credit.as_ref());
        let warnings = warnings::build_warnings(&plan, profile, credit.as_ref(), &outlook);
        let (quality_score, score_breakdown) = quality_score(
            &plan,
            annual.total,
            volatility,
            &warnings,
            &outlook,
            cheapest_fixed,
        );
        let cost_score = cost_score(annual.total, best_cost, worst_cost);
        let combined_score = combined_score(quality_score, cost_score);
        let is_gimmick = credit.is_some()
            || plan.is_tou
            || volatility::price_spread(&plan) > GIMMICK_SPREAD_FLOOR;

        RankedPlan {
            plan,
            annual_cost: annual.total,
            average_monthly_cost: annual.average_monthly,
            effective_rate: annual.effective_rate,
            monthly_costs: annual.monthly_totals,
            volatility,
            warnings,
            is_gimmick,
            quality_score,
            combined_score,
            score_breakdown,
        }
    }
}

struct Prepared {
    plan: ElectricityPlan,
    credit: Option<BillCredit>,
    annual: AnnualCost,
    outlook: ExpirationOutlook,
}

fn fold_costs(prepared: &[Prepared], pick: fn(f64, f64) -> f64) -> f64 {
    prepared
        .iter()
        .map(|candidate| candidate.annual.total)
        .reduce(pick)
        .unwrap_or(0.0)
}

/// Quality score in [0, 100] plus its component trail.
///
/// Non-fixed, prepaid, and time-of-use plans are disqualified outright with
/// a recorded reason; everything else starts at 100 and loses points for
/// cost, volatility, warnings, base charge, and renewal timing.
fn quality_score(
    plan: &ElectricityPlan,
    annual_cost: f64,
    volatility: f64,
    warnings: &[Warning],
    outlook: &ExpirationOutlook,
    cheapest_fixed: Option<f64>,
) -> (f64, Vec<ScoreComponent>) {
    let mut components = Vec::new();

    if plan.rate_type != RateType::Fixed {
        components.push(ScoreComponent {
            factor: ScoreFactor::RateType,
            points: -100.0,
            notes: format!(
                "{} rate: the price can change after any billing cycle",
                plan.rate_type.as_str().to_lowercase()
            ),
        });
        return (0.0, components);
    }
    if plan.is_prepaid {
        components.push(ScoreComponent {
            factor: ScoreFactor::Prepaid,
            points: -100.0,
            notes: "prepaid plans bill ahead of usage and disconnect quickly".to_string(),
        });
        return (0.0, components);
    }
    if plan.is_tou {
        components.push(ScoreComponent {
            factor: ScoreFactor::TimeOfUse,
            points: -100.0,
            notes: "time-of-use pricing depends on shifting household load".to_string(),
        });
        return (0.0, components);
    }

    let mut score = 100.0;

    if let Some(best) = cheapest_fixed {
        if best > 0.0 && annual_cost > best {
            let percent_above = (annual_cost - best) / best * 100.0;
            let penalty = percent_above.min(MAX_COST_PENALTY);
            score -= penalty;
            components.push(ScoreComponent {
                factor: ScoreFactor::CostAboveBest,
                points: -penalty,
                notes: format!(
                    "{percent_above:.0}% above the cheapest fixed-rate plan (${best:.0}/yr)"
                ),
            });
        }
    }

    let volatility_penalty = (volatility * MAX_VOLATILITY_PENALTY).round();
    if volatility_penalty > 0.0 {
        score -= volatility_penalty;
        components.push(ScoreComponent {
            factor: ScoreFactor::Volatility,
            points: -volatility_penalty,
            notes: format!("bill volatility {volatility:.2}"),
        });
    }

    let countable = warnings
        .iter()
        .filter(|warning| warning.kind != WarningKind::NonFixedRate)
        .count();
    if countable > 0 {
        let penalty = (WARNING_PENALTY_EACH * countable as f64).min(MAX_WARNING_PENALTY);
        score -= penalty;
        components.push(ScoreComponent {
            factor: ScoreFactor::Warnings,
            points: -penalty,
            notes: format!("{countable} plan warning(s)"),
        });
    }

    if plan.base_charge_monthly > BASE_CHARGE_FLOOR {
        let penalty =
            (plan.base_charge_monthly - BASE_CHARGE_FLOOR).min(MAX_BASE_CHARGE_PENALTY);
        score -= penalty;
        components.push(ScoreComponent {
            factor: ScoreFactor::BaseCharge,
            points: -penalty,
            notes: format!(
                "${:.2} monthly base charge exceeds ${BASE_CHARGE_FLOOR:.0}",
                plan.base_charge_monthly
            ),
        });
    }

    let expiration_penalty = match outlook.risk {
        RenewalRisk::High => HIGH_RISK_PENALTY,
        RenewalRisk::Medium => MEDIUM_RISK_PENALTY,
        RenewalRisk::Low | RenewalRisk::Optimal => 0.0,
    };
    if expiration_penalty > 0.0 {
        score -= expiration_penalty;
        components.push(ScoreComponent {
            factor: ScoreFactor::RenewalTiming,
            points: -expiration_penalty,
            notes: format!(
                "contract expires in a {}-risk renewal month",
                outlook.risk.label()
            ),
        });
    }

    (score.clamp(0.0, 100.0), components)
}

/// Position of a plan's annual cost within the candidate range, 100 = best.
/// A zero-width cost range yields 0 for every plan.
fn cost_score(annual_cost: f64, best_cost: f64, worst_cost: f64) -> f64 {
    let range = worst_cost - best_cost;
    if range > f64::EPSILON {
        100.0 - (annual_cost - best_cost) / range * 100.0
    } else {
        0.0
    }
}

/// Blend cost rank and quality into the final ordering key.
///
/// Plans below the acceptable quality floor are pushed far below every
/// acceptable plan regardless of price; marginal plans (60-69) take a flat
/// deduction.
fn combined_score(quality_score: f64, cost_score: f64) -> f64 {
    if quality_score < ACCEPTABLE_QUALITY_FLOOR {
        return quality_score - SUB_ACCEPTABLE_OFFSET + cost_score * 0.1;
    }
    let mut combined = cost_score * quality_score.max(1.0) / 100.0;
    if quality_score < GOOD_QUALITY_FLOOR {
        combined -= MARGINAL_QUALITY_PENALTY;
    }
    combined
}
