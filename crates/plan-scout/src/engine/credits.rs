//! Bill-credit clause extraction.
//!
//! Providers advertise usage-conditioned credits in free text ("$120 bill
//! credit when usage is between 1000-1050 kWh"). The parser handles exactly
//! one clause per plan; multi-tier credit schedules are out of scope and
//! yield the first clause only. Plans without parsable credit language get
//! no credit, which is a documented limitation rather than a defect.

use lazy_static::lazy_static;
use regex::Regex;

use crate::catalog::ElectricityPlan;

lazy_static! {
    // "$120 bill credit ... usage ... between 1000-1050 kWh" (also "to"/"and").
    static ref RANGE_CREDIT_REGEX: Regex = Regex::new(
        r"\$(\d+(?:\.\d+)?)\s+(?:bill\s+)?credit[^.]*?usage[^.]*?between\s+(\d{1,5})\s*(?:-|–|to|and)\s*(\d{1,5})\s*kwh"
    )
    .unwrap();
    // "$100 bill credit ... usage is exactly 1000 kWh" and looser "for usage of 1000 kWh".
    static ref EXACT_CREDIT_REGEX: Regex = Regex::new(
        r"\$(\d+(?:\.\d+)?)\s+(?:bill\s+)?credit[^.]*?usage[^.]*?(?:is\s+)?(?:exactly\s+|of\s+)?(\d{1,5})\s*kwh"
    )
    .unwrap();
}

/// A parsed usage-conditioned bill credit. Exact-value clauses become the
/// degenerate range `[value, value]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BillCredit {
    pub amount: f64,
    pub min_kwh: f64,
    pub max_kwh: f64,
    /// Name of the extraction rule that matched, for traceability.
    pub rule: &'static str,
}

impl BillCredit {
    /// Whether a month at this usage level qualifies. Usage is rounded to
    /// whole kWh before the inclusive window test.
    pub fn applies_to(&self, usage_kwh: f64) -> bool {
        let usage = usage_kwh.round();
        usage >= self.min_kwh && usage <= self.max_kwh
    }

    /// The credit earned at this usage level, or zero outside the window.
    pub fn amount_for_usage(&self, usage_kwh: f64) -> f64 {
        if self.applies_to(usage_kwh) {
            self.amount
        } else {
            0.0
        }
    }
}

type CreditRule = fn(&str) -> Option<BillCredit>;

/// Ordered extraction rules; the first match wins. The range rule runs
/// before the exact rule because the exact pattern would otherwise capture
/// the upper bound of a range clause.
const RULES: &[(&str, CreditRule)] = &[("range-window", range_window), ("exact-value", exact_value)];

/// Extract a bill-credit clause from a plan's free-text fields.
pub fn parse_bill_credit(plan: &ElectricityPlan) -> Option<BillCredit> {
    let text = plan.free_text();
    if text.is_empty() {
        return None;
    }
    RULES.iter().copied().find_map(|(name, rule)| {
        rule(&text).map(|mut credit| {
            credit.rule = name;
            credit
        })
    })
}

fn range_window(text: &str) -> Option<BillCredit> {
    let captures = RANGE_CREDIT_REGEX.captures(text)?;
    let amount = captures[1].parse().ok()?;
    let min_kwh: f64 = captures[2].parse().ok()?;
    let max_kwh: f64 = captures[3].parse().ok()?;
    if min_kwh > max_kwh {
        return None;
    }
    Some(BillCredit {
        amount,
        min_kwh,
        max_kwh,
        rule: "",
    })
}

fn exact_value(text: &str) -> Option<BillCredit> {
    let captures = EXACT_CREDIT_REGEX.captures(text)?;
    let amount = captures[1].parse().ok()?;
    let value: f64 = captures[2].parse().ok()?;
    Some(BillCredit {
        amount,
        min_kwh: value,
        max_kwh: value,
        rule: "",
    })
}
