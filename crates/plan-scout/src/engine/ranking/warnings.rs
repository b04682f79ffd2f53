use serde::Serialize;

use crate::catalog::{ElectricityPlan, RateType};
use crate::engine::credits::BillCredit;
use crate::engine::etf;
use crate::engine::ranking::volatility::credit_miss_count;
use crate::engine::renewal::{ExpirationOutlook, RenewalRisk};
use crate::engine::usage::UsageProfile;

const ETF_CAUTION_FLOOR: f64 = 200.0;
const SPREAD_CAUTION_FLOOR: f64 = 0.5;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    BillCreditMiss,
    TimeOfUse,
    EarlyTerminationFee,
    RateSpread,
    PeakSeasonExpiration,
    /// Synthetic marker for non-fixed rates; excluded from the warning
    /// penalty because the quality score already zeroes those plans.
    NonFixedRate,
}

/// A short consumer-facing caution about a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

/// Build the warning list for one plan against one usage profile.
pub(crate) fn build_warnings(
    plan: &ElectricityPlan,
    profile: &UsageProfile,
    credit: Option<&BillCredit>,
    outlook: &ExpirationOutlook,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if let Some(credit) = credit {
        let misses = credit_miss_count(profile, credit);
        if misses > 0 {
            warnings.push(Warning {
                kind: WarningKind::BillCreditMiss,
                message: format!(
                    "Misses the ${:.0} bill credit in {misses} of 12 months (about ${:.0} over a year)",
                    credit.amount,
                    credit.amount * misses as f64
                ),
            });
        }
    }

    if plan.is_tou {
        warnings.push(Warning {
            kind: WarningKind::TimeOfUse,
            message: "Time-of-use plan: the advertised rate only applies during limited hours"
                .to_string(),
        });
    }

    let midpoint = plan.term_months / 2;
    let fee = etf::early_termination_fee(plan, midpoint);
    if fee.total > ETF_CAUTION_FLOOR {
        warnings.push(Warning {
            kind: WarningKind::EarlyTerminationFee,
            message: format!("Cancelling midway through the term costs ${:.0}", fee.total),
        });
    }

    if low_high_spread(plan) > SPREAD_CAUTION_FLOOR {
        warnings.push(Warning {
            kind: WarningKind::RateSpread,
            message: "Price per kWh changes more than 50% between low and high usage".to_string(),
        });
    }

    if outlook.risk == RenewalRisk::High {
        warnings.push(Warning {
            kind: WarningKind::PeakSeasonExpiration,
            message: format!(
                "Contract expires in {}, a peak renewal month",
                month_name(outlook.expiration_month)
            ),
        });
    }

    if plan.rate_type != RateType::Fixed {
        warnings.push(Warning {
            kind: WarningKind::NonFixedRate,
            message: "Variable or indexed rate: the price can change month to month".to_string(),
        });
    }

    warnings
}

// Spread between the 500 and 2000 kWh tier prices, the two ends of the
// published schedule.
fn low_high_spread(plan: &ElectricityPlan) -> f64 {
    let low = plan.price_kwh_500;
    let high = plan.price_kwh_2000;
    let min = low.min(high);
    if min > 0.0 {
        (low - high).abs() / min
    } else {
        0.0
    }
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize - 1) % 12]
}
