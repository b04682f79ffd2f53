use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Valid rate types for electricity plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RateType {
    Fixed,
    Variable,
    Indexed,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Fixed => "FIXED",
            RateType::Variable => "VARIABLE",
            RateType::Indexed => "INDEXED",
        }
    }
}

impl TryFrom<String> for RateType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FIXED" => Ok(RateType::Fixed),
            "VARIABLE" => Ok(RateType::Variable),
            "INDEXED" => Ok(RateType::Indexed),
            other => Err(format!(
                "invalid rate_type '{other}', expected FIXED, VARIABLE, or INDEXED"
            )),
        }
    }
}

impl From<RateType> for String {
    fn from(value: RateType) -> Self {
        value.as_str().to_string()
    }
}

/// Early termination fee calculation structure, as published upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EtfStructure {
    Flat,
    PerMonthRemaining,
    Unknown,
}

/// Provenance of structured ETF information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EtfSource {
    Efl,
    TextParsing,
    Legacy,
}

/// Early termination fee details extracted from an EFL document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfDetails {
    pub structure: EtfStructure,
    #[serde(default)]
    pub base_amount: Option<f64>,
    pub source: EtfSource,
}

/// A single retail electricity offer as fetched from Power to Choose.
///
/// The engine treats every instance as immutable; computed values are carried
/// on wrapper records, never written back here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityPlan {
    pub plan_id: String,
    pub plan_name: String,
    pub rep_name: String,
    pub tdu_area: String,
    pub rate_type: RateType,
    pub term_months: u32,
    pub price_kwh_500: f64,
    pub price_kwh_1000: f64,
    pub price_kwh_2000: f64,
    #[serde(default)]
    pub base_charge_monthly: f64,
    #[serde(default)]
    pub early_termination_fee: Option<f64>,
    #[serde(default)]
    pub etf_details: Option<EtfDetails>,
    #[serde(default)]
    pub renewable_pct: u8,
    #[serde(default)]
    pub is_prepaid: bool,
    #[serde(default)]
    pub is_tou: bool,
    #[serde(default)]
    pub special_terms: Option<String>,
    #[serde(default)]
    pub promotion_details: Option<String>,
    #[serde(default)]
    pub fees_credits: Option<String>,
    #[serde(default)]
    pub min_usage_fees: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub efl_url: Option<String>,
    #[serde(default)]
    pub enrollment_url: Option<String>,
    #[serde(default)]
    pub terms_url: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl ElectricityPlan {
    /// Concatenated, lowercased free-text fields for the pattern heuristics.
    pub fn free_text(&self) -> String {
        [
            self.special_terms.as_deref(),
            self.promotion_details.as_deref(),
            self.fees_credits.as_deref(),
            self.min_usage_fees.as_deref(),
        ]
        .iter()
        .flatten()
        .map(|text| text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub(crate) fn validation_failure(&self) -> Option<String> {
        if self.tdu_area.trim().is_empty() {
            return Some("tdu_area cannot be empty".to_string());
        }
        for (label, price) in [
            ("price_kwh_500", self.price_kwh_500),
            ("price_kwh_1000", self.price_kwh_1000),
            ("price_kwh_2000", self.price_kwh_2000),
            ("base_charge_monthly", self.base_charge_monthly),
        ] {
            if !price.is_finite() || price < 0.0 {
                return Some(format!("{label} must be a non-negative number"));
            }
        }
        if self.renewable_pct > 100 {
            return Some("renewable_pct cannot exceed 100".to_string());
        }
        None
    }
}

/// TDU delivery rate information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TduRate {
    pub code: String,
    pub name: String,
    pub monthly_base_charge: f64,
    pub per_kwh_rate: f64,
    pub effective_date: String,
    #[serde(default)]
    pub zip_codes: Vec<(u32, u32)>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TduRate {
    pub fn covers_zip(&self, zip: u32) -> bool {
        self.zip_codes.iter().any(|(lo, hi)| (*lo..=*hi).contains(&zip))
    }
}

/// Where a resolved local tax rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxSource {
    MajorCity,
    ZipRange,
    Default,
}

/// Resolved local sales tax for a ZIP code, as a 0..=1 fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxInfo {
    pub rate: f64,
    pub region: String,
    pub source: TaxSource,
}

/// Metadata block of the plans.json file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlansMetadata {
    pub fetched_at: String,
    pub total_plans: usize,
    pub source: String,
}

/// Full plans.json file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlansData {
    pub plans: Vec<ElectricityPlan>,
    pub metadata: PlansMetadata,
}

/// Full tdu-rates.json file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TduRatesData {
    pub tdus: Vec<TduRate>,
    pub last_updated: String,
    pub next_update: String,
}

/// Tax data for a major city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityTaxData {
    pub rate: f64,
    #[serde(default)]
    pub tdu: Option<String>,
    #[serde(default = "default_deregulated")]
    pub deregulated: bool,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub zip_codes: Vec<String>,
}

fn default_deregulated() -> bool {
    true
}

/// Tax data for a ZIP range keyed as "lo-hi".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTaxData {
    pub rate: f64,
    pub region: String,
    #[serde(default)]
    pub tdu: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Full local-taxes.json file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTaxesData {
    #[serde(default)]
    pub major_cities: BTreeMap<String, CityTaxData>,
    #[serde(default)]
    pub zip_code_ranges: BTreeMap<String, RangeTaxData>,
    #[serde(default)]
    pub default_local_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_type_parses_case_insensitively() {
        assert_eq!(RateType::try_from("fixed".to_string()), Ok(RateType::Fixed));
        assert_eq!(
            RateType::try_from(" Variable ".to_string()),
            Ok(RateType::Variable)
        );
        assert!(RateType::try_from("prepaid".to_string()).is_err());
    }

    #[test]
    fn etf_structure_round_trips_kebab_case() {
        let json = serde_json::to_string(&EtfStructure::PerMonthRemaining).expect("serializes");
        assert_eq!(json, "\"per-month-remaining\"");
        let back: EtfStructure = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, EtfStructure::PerMonthRemaining);
    }

    #[test]
    fn free_text_concatenates_and_lowercases() {
        let plan = ElectricityPlan {
            special_terms: Some("No Early Termination Fee.".to_string()),
            fees_credits: Some("$75 Bill Credit".to_string()),
            ..crate::engine::tests::fixtures::simple_fixed_plan("TEST_1")
        };
        let text = plan.free_text();
        assert!(text.contains("no early termination fee"));
        assert!(text.contains("$75 bill credit"));
    }

    #[test]
    fn tdu_rate_zip_ranges_are_inclusive() {
        let tdu = TduRate {
            code: "ONCOR".to_string(),
            name: "Oncor Electric Delivery".to_string(),
            monthly_base_charge: 4.23,
            per_kwh_rate: 4.56,
            effective_date: "2025-03-01".to_string(),
            zip_codes: vec![(75001, 75099), (76000, 76099)],
            notes: None,
        };
        assert!(tdu.covers_zip(75001));
        assert!(tdu.covers_zip(75099));
        assert!(tdu.covers_zip(76050));
        assert!(!tdu.covers_zip(75100));
    }

    #[test]
    fn validation_rejects_negative_prices() {
        let mut plan = crate::engine::tests::fixtures::simple_fixed_plan("TEST_1");
        plan.price_kwh_1000 = -1.0;
        assert!(plan.validation_failure().is_some());
    }
}
