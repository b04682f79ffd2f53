use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use plan_scout::catalog::{TaxInfo, TduRate};
use plan_scout::engine::usage::{
    average_for_home_size, estimate_usage_pattern, UsageProfile, FALLBACK_AVERAGE_KWH,
};
use plan_scout::error::EngineError;
use plan_scout::PlanCatalog;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::AppError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<PlanCatalog>,
}

/// Usage inputs accepted by the rank endpoint and CLI, in precedence order:
/// explicit monthly values, then an average, then a home-size label.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UsageInput {
    #[serde(default)]
    pub(crate) monthly_usage: Option<Vec<f64>>,
    #[serde(default)]
    pub(crate) average_monthly_kwh: Option<f64>,
    #[serde(default)]
    pub(crate) home_size: Option<String>,
}

impl UsageInput {
    pub(crate) fn resolve(&self) -> Result<UsageProfile, AppError> {
        if let Some(values) = &self.monthly_usage {
            return UsageProfile::try_new(values).map_err(AppError::from);
        }
        if let Some(average) = self.average_monthly_kwh {
            return Ok(estimate_usage_pattern(average));
        }
        if let Some(label) = &self.home_size {
            return Ok(estimate_usage_pattern(average_for_home_size(label)));
        }
        Ok(estimate_usage_pattern(FALLBACK_AVERAGE_KWH))
    }
}

/// Resolve the TDU delivery rate and local tax for a request. An explicit
/// area code wins over a ZIP; with neither (or an unparseable ZIP) the
/// ranker's missing-TDU error surfaces as a client error.
pub(crate) fn resolve_service_area(
    catalog: &PlanCatalog,
    tdu_area: Option<&str>,
    zip: Option<&str>,
) -> Result<(TduRate, TaxInfo), AppError> {
    let tax = zip
        .map(|zip| catalog.tax_for_zip(zip))
        .unwrap_or_else(|| catalog.tax_for_zip(""));

    if let Some(area) = tdu_area {
        return Ok((catalog.tdu_for_area(area)?.clone(), tax));
    }

    if let Some(zip) = zip {
        let numeric: u32 = zip
            .trim()
            .parse()
            .map_err(|_| EngineError::MissingTduRate)?;
        return Ok((catalog.tdu_for_zip(numeric)?.clone(), tax));
    }

    Err(EngineError::MissingTduRate.into())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
