use serde::Serialize;

use crate::catalog::{ElectricityPlan, TduRate};
use crate::engine::credits::{self, BillCredit};
use crate::engine::usage::UsageProfile;

/// Interpolated ¢/kWh price at a usage level, from the three published
/// tier prices (500 / 1000 / 2000 kWh).
///
/// Usage at or below 500 kWh uses the 500 price; above 2000 kWh the 2000
/// price extrapolates flat; in between the price is piecewise linear.
pub fn interpolate_rate(usage_kwh: f64, plan: &ElectricityPlan) -> f64 {
    if usage_kwh <= 500.0 {
        plan.price_kwh_500
    } else if usage_kwh <= 1000.0 {
        linear(
            usage_kwh,
            500.0,
            plan.price_kwh_500,
            1000.0,
            plan.price_kwh_1000,
        )
    } else if usage_kwh <= 2000.0 {
        linear(
            usage_kwh,
            1000.0,
            plan.price_kwh_1000,
            2000.0,
            plan.price_kwh_2000,
        )
    } else {
        plan.price_kwh_2000
    }
}

fn linear(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// One month's bill at a given usage level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCost {
    pub total: f64,
    pub energy_cost: f64,
    pub base_charge: f64,
    pub bill_credit: f64,
    /// What the TDU delivery would cost on its own. Shown for transparency
    /// only; published plan prices already embed delivery by regulatory
    /// mandate, so this is never part of `total`.
    pub tdu_cost: f64,
    pub effective_rate: f64,
}

/// Compute one month's bill.
pub fn monthly_cost(
    plan: &ElectricityPlan,
    usage_kwh: f64,
    tdu: &TduRate,
    tax_rate: f64,
) -> MonthlyCost {
    let credit = credits::parse_bill_credit(plan);
    monthly_cost_with_credit(plan, usage_kwh, tdu, tax_rate, credit.as_ref())
}

pub(crate) fn monthly_cost_with_credit(
    plan: &ElectricityPlan,
    usage_kwh: f64,
    tdu: &TduRate,
    tax_rate: f64,
    credit: Option<&BillCredit>,
) -> MonthlyCost {
    let rate = interpolate_rate(usage_kwh, plan);
    let energy_cost = usage_kwh * rate / 100.0;
    let tdu_cost = tdu.monthly_base_charge + usage_kwh * tdu.per_kwh_rate / 100.0;
    let bill_credit = credit
        .map(|credit| credit.amount_for_usage(usage_kwh))
        .unwrap_or(0.0);

    let subtotal = (energy_cost + plan.base_charge_monthly - bill_credit).max(0.0);
    let total = subtotal * (1.0 + tax_rate);
    let effective_rate = if usage_kwh > 0.0 {
        total / usage_kwh * 100.0
    } else {
        0.0
    };

    MonthlyCost {
        total,
        energy_cost,
        base_charge: plan.base_charge_monthly,
        bill_credit,
        tdu_cost,
        effective_rate,
    }
}

/// A full year's cost over a usage profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualCost {
    pub total: f64,
    pub monthly_totals: [f64; 12],
    pub total_usage_kwh: f64,
    pub average_monthly: f64,
    pub effective_rate: f64,
}

/// Sum the twelve monthly bills for a usage profile.
///
/// The 12-month requirement is enforced by the [`UsageProfile`] type;
/// constructing one from a wrong-length slice already failed upstream.
pub fn annual_cost(
    plan: &ElectricityPlan,
    profile: &UsageProfile,
    tdu: &TduRate,
    tax_rate: f64,
) -> AnnualCost {
    let credit = credits::parse_bill_credit(plan);

    let mut monthly_totals = [0.0_f64; 12];
    for (slot, usage) in monthly_totals.iter_mut().zip(profile.months()) {
        *slot = monthly_cost_with_credit(plan, *usage, tdu, tax_rate, credit.as_ref()).total;
    }

    let total: f64 = monthly_totals.iter().sum();
    let total_usage_kwh = profile.total();
    let effective_rate = if total_usage_kwh > 0.0 {
        total / total_usage_kwh * 100.0
    } else {
        0.0
    };

    AnnualCost {
        total,
        monthly_totals,
        total_usage_kwh,
        average_monthly: total / 12.0,
        effective_rate,
    }
}
