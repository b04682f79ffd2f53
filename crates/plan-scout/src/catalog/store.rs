use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use super::domain::{
    ElectricityPlan, LocalTaxesData, PlansData, TaxInfo, TaxSource, TduRate, TduRatesData,
};

/// Errors raised while hydrating or querying the reference data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("plan '{plan_id}' failed validation: {reason}")]
    InvalidPlan { plan_id: String, reason: String },
    #[error("no TDU delivery rate on file for area '{area}'")]
    UnknownTduArea { area: String },
    #[error("no TDU delivery rate covers ZIP code {zip}")]
    UnknownZip { zip: u32 },
}

/// Read-only reference data: plans, TDU delivery rates, and local tax rates.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<ElectricityPlan>,
    tdus: Vec<TduRate>,
    taxes: LocalTaxesData,
}

impl PlanCatalog {
    /// Build a catalog from already-hydrated records, validating each plan.
    pub fn from_parts(
        plans: Vec<ElectricityPlan>,
        tdus: Vec<TduRate>,
        taxes: LocalTaxesData,
    ) -> Result<Self, CatalogError> {
        for plan in &plans {
            if let Some(reason) = plan.validation_failure() {
                return Err(CatalogError::InvalidPlan {
                    plan_id: plan.plan_id.clone(),
                    reason,
                });
            }
        }
        debug!(
            plans = plans.len(),
            tdus = tdus.len(),
            "catalog hydrated"
        );
        Ok(Self { plans, tdus, taxes })
    }

    /// Parse the three data files from readers.
    pub fn from_readers<P, T, L>(plans: P, tdus: T, taxes: L) -> Result<Self, CatalogError>
    where
        P: Read,
        T: Read,
        L: Read,
    {
        let plans: PlansData = parse_json("plans.json", plans)?;
        let tdus: TduRatesData = parse_json("tdu-rates.json", tdus)?;
        let taxes: LocalTaxesData = parse_json("local-taxes.json", taxes)?;
        Self::from_parts(plans.plans, tdus.tdus, taxes)
    }

    /// Load `plans.json`, `tdu-rates.json`, and `local-taxes.json` from a directory.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let plans = open(dir, "plans.json")?;
        let tdus = open(dir, "tdu-rates.json")?;
        let taxes = open(dir, "local-taxes.json")?;
        Self::from_readers(plans, tdus, taxes)
    }

    pub fn plans(&self) -> &[ElectricityPlan] {
        &self.plans
    }

    /// All plans offered in a TDU service area.
    pub fn plans_for_area(&self, area: &str) -> Vec<ElectricityPlan> {
        self.plans
            .iter()
            .filter(|plan| plan.tdu_area.eq_ignore_ascii_case(area))
            .cloned()
            .collect()
    }

    pub fn tdu_for_area(&self, area: &str) -> Result<&TduRate, CatalogError> {
        self.tdus
            .iter()
            .find(|tdu| tdu.code.eq_ignore_ascii_case(area))
            .ok_or_else(|| CatalogError::UnknownTduArea {
                area: area.to_string(),
            })
    }

    pub fn tdu_for_zip(&self, zip: u32) -> Result<&TduRate, CatalogError> {
        self.tdus
            .iter()
            .find(|tdu| tdu.covers_zip(zip))
            .ok_or(CatalogError::UnknownZip { zip })
    }

    /// Resolve the local tax rate for a ZIP code.
    ///
    /// Resolution order: major-city ZIP list, then "lo-hi" range keys, then
    /// the statewide default. Never fails; the default is an explicit value.
    pub fn tax_for_zip(&self, zip: &str) -> TaxInfo {
        let trimmed = zip.trim();

        for (city, data) in &self.taxes.major_cities {
            if data.zip_codes.iter().any(|candidate| candidate == trimmed) {
                return TaxInfo {
                    rate: data.rate,
                    region: city.clone(),
                    source: TaxSource::MajorCity,
                };
            }
        }

        if let Ok(numeric) = trimmed.parse::<u32>() {
            for (range, data) in &self.taxes.zip_code_ranges {
                if let Some((lo, hi)) = parse_zip_range(range) {
                    if (lo..=hi).contains(&numeric) {
                        return TaxInfo {
                            rate: data.rate,
                            region: data.region.clone(),
                            source: TaxSource::ZipRange,
                        };
                    }
                }
            }
        }

        TaxInfo {
            rate: self.taxes.default_local_rate,
            region: "statewide default".to_string(),
            source: TaxSource::Default,
        }
    }
}

fn open(dir: &Path, file: &str) -> Result<BufReader<File>, CatalogError> {
    File::open(dir.join(file))
        .map(BufReader::new)
        .map_err(|source| CatalogError::Io {
            file: file.to_string(),
            source,
        })
}

fn parse_json<T: serde::de::DeserializeOwned, R: Read>(
    file: &str,
    reader: R,
) -> Result<T, CatalogError> {
    serde_json::from_reader(reader).map_err(|source| CatalogError::Json {
        file: file.to_string(),
        source,
    })
}

fn parse_zip_range(range: &str) -> Option<(u32, u32)> {
    let (lo, hi) = range.split_once('-')?;
    Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{CityTaxData, RangeTaxData};
    use std::collections::BTreeMap;

    fn taxes() -> LocalTaxesData {
        let mut major_cities = BTreeMap::new();
        major_cities.insert(
            "dallas".to_string(),
            CityTaxData {
                rate: 0.0825,
                tdu: Some("ONCOR".to_string()),
                deregulated: true,
                note: None,
                zip_codes: vec!["75201".to_string(), "75202".to_string()],
            },
        );
        let mut zip_code_ranges = BTreeMap::new();
        zip_code_ranges.insert(
            "77000-77099".to_string(),
            RangeTaxData {
                rate: 0.0815,
                region: "Houston metro".to_string(),
                tdu: Some("CENTERPOINT".to_string()),
                note: None,
            },
        );
        LocalTaxesData {
            major_cities,
            zip_code_ranges,
            default_local_rate: 0.0625,
        }
    }

    fn catalog() -> PlanCatalog {
        let tdu = TduRate {
            code: "ONCOR".to_string(),
            name: "Oncor Electric Delivery".to_string(),
            monthly_base_charge: 4.23,
            per_kwh_rate: 4.56,
            effective_date: "2025-03-01".to_string(),
            zip_codes: vec![(75001, 75999)],
            notes: None,
        };
        let plan = crate::engine::tests::fixtures::simple_fixed_plan("STORE_1");
        PlanCatalog::from_parts(vec![plan], vec![tdu], taxes()).expect("catalog builds")
    }

    #[test]
    fn tax_resolution_prefers_major_city_over_range() {
        let catalog = catalog();
        let tax = catalog.tax_for_zip("75201");
        assert_eq!(tax.source, TaxSource::MajorCity);
        assert_eq!(tax.region, "dallas");
        assert!((tax.rate - 0.0825).abs() < f64::EPSILON);
    }

    #[test]
    fn tax_resolution_falls_through_range_to_default() {
        let catalog = catalog();
        let range = catalog.tax_for_zip("77042");
        assert_eq!(range.source, TaxSource::ZipRange);
        assert_eq!(range.region, "Houston metro");

        let default = catalog.tax_for_zip("79901");
        assert_eq!(default.source, TaxSource::Default);
        assert!((default.rate - 0.0625).abs() < f64::EPSILON);
    }

    #[test]
    fn tdu_lookups_cover_area_and_zip() {
        let catalog = catalog();
        assert!(catalog.tdu_for_area("oncor").is_ok());
        assert!(catalog.tdu_for_zip(75201).is_ok());
        assert!(matches!(
            catalog.tdu_for_area("NOWHERE"),
            Err(CatalogError::UnknownTduArea { .. })
        ));
        assert!(matches!(
            catalog.tdu_for_zip(11111),
            Err(CatalogError::UnknownZip { zip: 11111 })
        ));
    }

    #[test]
    fn from_parts_rejects_invalid_plans() {
        let mut plan = crate::engine::tests::fixtures::simple_fixed_plan("BAD_1");
        plan.tdu_area = "  ".to_string();
        let result = PlanCatalog::from_parts(vec![plan], Vec::new(), taxes());
        assert!(matches!(result, Err(CatalogError::InvalidPlan { .. })));
    }

    #[test]
    fn plans_data_parses_sample_document() {
        let raw = r#"{
            "plans": [{
                "plan_id": "GEXA_SAVER_12",
                "plan_name": "Saver Supreme 12",
                "rep_name": "Gexa Energy",
                "tdu_area": "ONCOR",
                "rate_type": "FIXED",
                "term_months": 12,
                "price_kwh_500": 11.9,
                "price_kwh_1000": 9.5,
                "price_kwh_2000": 8.9,
                "base_charge_monthly": 4.95,
                "early_termination_fee": 175.0,
                "renewable_pct": 100
            }],
            "metadata": {
                "fetched_at": "2025-08-01T00:00:00Z",
                "total_plans": 1,
                "source": "powertochoose.org"
            }
        }"#;
        let parsed: PlansData = serde_json::from_str(raw).expect("plans document parses");
        assert_eq!(parsed.plans.len(), 1);
        assert_eq!(parsed.plans[0].language, "en");
        assert!(!parsed.plans[0].is_prepaid);
    }
}
