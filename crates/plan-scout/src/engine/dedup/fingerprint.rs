use crate::catalog::{ElectricityPlan, RateType};

/// Trailing corporate designators stripped during provider normalization.
const LEGAL_SUFFIXES: &[&str] = &["llc", "inc", "lp", "ltd", "co", "corp", "company"];

/// Canonical key over the eleven substantive fields of a plan.
///
/// Free text is deliberately excluded: identical numeric fingerprints imply
/// identical substantive terms regardless of marketing language. Prices are
/// held as rounded integer units (tenths of a mil for ¢/kWh, cents for
/// dollar amounts) so the key is `Eq + Hash`. An absent ETF stays distinct
/// from an explicit $0.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    provider: String,
    tdu_area: String,
    rate_type: RateType,
    price_500_tenth_mils: i64,
    price_1000_tenth_mils: i64,
    price_2000_tenth_mils: i64,
    term_months: u32,
    etf_cents: Option<i64>,
    base_charge_cents: i64,
    renewable_pct: u8,
    is_prepaid: bool,
    is_tou: bool,
}

/// Derive the canonical fingerprint for a plan.
pub fn fingerprint(plan: &ElectricityPlan) -> Fingerprint {
    Fingerprint {
        provider: normalize_provider(&plan.rep_name),
        tdu_area: plan.tdu_area.trim().to_ascii_uppercase(),
        rate_type: plan.rate_type,
        price_500_tenth_mils: round_price(plan.price_kwh_500),
        price_1000_tenth_mils: round_price(plan.price_kwh_1000),
        price_2000_tenth_mils: round_price(plan.price_kwh_2000),
        term_months: plan.term_months,
        etf_cents: plan.early_termination_fee.map(round_dollars),
        base_charge_cents: round_dollars(plan.base_charge_monthly),
        renewable_pct: plan.renewable_pct,
        is_prepaid: plan.is_prepaid,
        is_tou: plan.is_tou,
    }
}

/// Lowercase, collapse whitespace, and strip trailing legal suffixes so
/// "Gexa Energy, LLC" and "GEXA ENERGY" key identically.
pub fn normalize_provider(name: &str) -> String {
    let collapsed = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut words: Vec<&str> = collapsed.split(' ').collect();
    while words.len() > 1 {
        let bare: String = words
            .last()
            .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect())
            .unwrap_or_default();
        if LEGAL_SUFFIXES.contains(&bare.as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    words
        .join(" ")
        .trim_end_matches([',', '.'])
        .to_string()
}

// Three decimals for ¢/kWh prices.
fn round_price(price: f64) -> i64 {
    (price * 1000.0).round() as i64
}

// Two decimals for dollar amounts.
fn round_dollars(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
