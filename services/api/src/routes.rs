use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use plan_scout::catalog::{TaxInfo, TduRate};
use plan_scout::engine::dedup::DeduplicationSummary;
use plan_scout::engine::ranking::{PlanRanker, RankedPlan};
use plan_scout::engine::usage::UsageProfile;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::infra::{deserialize_optional_date, resolve_service_area, AppState, UsageInput};

#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    #[serde(default)]
    pub(crate) zip: Option<String>,
    #[serde(default)]
    pub(crate) tdu_area: Option<String>,
    #[serde(flatten)]
    pub(crate) usage: UsageInput,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) contract_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) reference_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    pub(crate) reference_date: NaiveDate,
    pub(crate) tdu: TduRate,
    pub(crate) tax: TaxInfo,
    pub(crate) usage: UsageProfile,
    pub(crate) dedup: DeduplicationSummary,
    pub(crate) plans: Vec<RankedPlan>,
}

pub(crate) fn router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/plans/rank", axum::routing::post(rank_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rank_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let (tdu, tax) = resolve_service_area(
        &state.catalog,
        payload.tdu_area.as_deref(),
        payload.zip.as_deref(),
    )?;
    let usage = payload.usage.resolve()?;
    let reference_date = payload
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());

    let plans = state.catalog.plans_for_area(&tdu.code);
    let ranker = PlanRanker::new(Some(tdu), tax)?;
    let outcome = ranker.rank(&plans, &usage, reference_date, payload.contract_start)?;

    Ok(Json(RankResponse {
        reference_date,
        tdu: ranker.tdu().clone(),
        tax: ranker.tax().clone(),
        usage,
        dedup: outcome.dedup,
        plans: outcome.plans,
    }))
}
