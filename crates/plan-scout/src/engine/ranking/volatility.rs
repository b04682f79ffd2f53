use crate::catalog::{ElectricityPlan, RateType};
use crate::engine::credits::BillCredit;
use crate::engine::usage::UsageProfile;

const NON_FIXED_WEIGHT: f64 = 0.6;
const CREDIT_LANGUAGE_WEIGHT: f64 = 0.5;
const CREDIT_MISS_WEIGHT: f64 = 0.3;
const TIME_OF_USE_WEIGHT: f64 = 0.3;
const SPREAD_THRESHOLD: f64 = 0.3;
const SPREAD_WEIGHT: f64 = 0.5;

/// How unpredictable a plan's monthly bill is, in [0, 1].
///
/// Non-fixed rates, usage-conditioned credits (weighted by how many of the
/// household's months miss the window), time-of-use pricing, and a steep
/// tier-price spread all push the score up.
pub(crate) fn volatility_score(
    plan: &ElectricityPlan,
    profile: &UsageProfile,
    credit: Option<&BillCredit>,
) -> f64 {
    let mut score = 0.0;

    if plan.rate_type != RateType::Fixed {
        score += NON_FIXED_WEIGHT;
    }

    if let Some(credit) = credit {
        let misses = credit_miss_count(profile, credit);
        score += CREDIT_LANGUAGE_WEIGHT + CREDIT_MISS_WEIGHT * misses as f64 / 12.0;
    }

    if plan.is_tou {
        score += TIME_OF_USE_WEIGHT;
    }

    let spread = price_spread(plan);
    if spread > SPREAD_THRESHOLD {
        score += (SPREAD_WEIGHT * spread).min(SPREAD_WEIGHT);
    }

    score.min(1.0)
}

/// Months of the profile that fall outside the credit window.
pub(crate) fn credit_miss_count(profile: &UsageProfile, credit: &BillCredit) -> usize {
    profile
        .months()
        .iter()
        .filter(|usage| !credit.applies_to(**usage))
        .count()
}

/// Relative spread of the three published tier prices.
pub(crate) fn price_spread(plan: &ElectricityPlan) -> f64 {
    let prices = [
        plan.price_kwh_500,
        plan.price_kwh_1000,
        plan.price_kwh_2000,
    ];
    let min = prices.iter().fold(f64::INFINITY, |acc, p| acc.min(*p));
    let max = prices.iter().fold(f64::NEG_INFINITY, |acc, p| acc.max(*p));
    if min > 0.0 {
        (max - min) / min
    } else {
        0.0
    }
}
