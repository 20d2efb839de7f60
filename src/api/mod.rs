use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    DebtEntry, FinancialSnapshot, HealthReport, PayoffMonth, PayoffReport, PayoffStrategy,
    PlanReport, ScoreRating, improvement_tips, lenient_amount, plan_payoff, rate_score,
    run_payoff_schedule, score_health, simulate_payoff,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(alias = "Avalanche")]
    Avalanche,
    #[serde(alias = "Snowball")]
    Snowball,
}

impl From<ApiStrategy> for PayoffStrategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Avalanche => PayoffStrategy::Avalanche,
            ApiStrategy::Snowball => PayoffStrategy::Snowball,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    financial_data: Option<FinancialSnapshot>,
    debts: Vec<DebtEntry>,
    #[serde(deserialize_with = "lenient_amount")]
    extra_payment: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulePayload {
    #[serde(default)]
    debts: Vec<DebtEntry>,
    #[serde(default, deserialize_with = "lenient_amount")]
    extra_payment: Option<f64>,
    strategy: ApiStrategy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub score: Option<HealthReport>,
    pub rating: Option<ScoreRating>,
    pub tips: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub plan: Option<PlanReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub summary: PayoffReport,
    pub months: Vec<PayoffMonth>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_health_response(snapshot: &FinancialSnapshot) -> HealthResponse {
    match score_health(snapshot) {
        Some(report) => HealthResponse {
            score: Some(report),
            rating: Some(rate_score(report.total)),
            tips: improvement_tips(&report),
        },
        None => HealthResponse {
            score: None,
            rating: None,
            tips: Vec::new(),
        },
    }
}

pub fn build_plan_response(
    debts: &[DebtEntry],
    extra_payment: Option<f64>,
    snapshot: Option<&FinancialSnapshot>,
) -> PlanResponse {
    PlanResponse {
        plan: plan_payoff(debts, extra_payment, snapshot),
    }
}

/// Schedules one strategy for the eligible debts. The extra payment defaults
/// to zero here since there is no plan context to derive one from.
pub fn build_schedule_response(
    entries: &[DebtEntry],
    extra_payment: Option<f64>,
    strategy: PayoffStrategy,
) -> Result<ScheduleResponse, String> {
    let debts: Vec<_> = entries.iter().filter_map(DebtEntry::to_debt).collect();
    if debts.is_empty() {
        return Err(
            "at least one debt with a positive balance, non-negative rate and positive minimum payment is required"
                .to_string(),
        );
    }
    let extra = extra_payment.unwrap_or(0.0);
    Ok(ScheduleResponse {
        summary: simulate_payoff(&debts, extra, strategy),
        months: run_payoff_schedule(&debts, extra, strategy),
    })
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/health-score",
            get(health_get_handler).post(health_post_handler),
        )
        .route("/api/payoff-plan", post(plan_handler))
        .route("/api/payoff-schedule", post(schedule_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "smartmoney HTTP API listening");
    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn health_get_handler(
    query: Result<Query<FinancialSnapshot>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(snapshot)) => health_handler_impl(snapshot),
        Err(rejection) => rejection_response(rejection.status(), rejection.body_text()),
    }
}

async fn health_post_handler(body: Result<Json<FinancialSnapshot>, JsonRejection>) -> Response {
    match body {
        Ok(Json(snapshot)) => health_handler_impl(snapshot),
        Err(rejection) => rejection_response(rejection.status(), rejection.body_text()),
    }
}

fn health_handler_impl(snapshot: FinancialSnapshot) -> Response {
    let response = build_health_response(&snapshot);
    debug!(
        total = response.score.map(|s| s.total),
        "computed health score"
    );
    json_response(StatusCode::OK, response)
}

async fn plan_handler(body: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let response = build_plan_response(
        &payload.debts,
        payload.extra_payment,
        payload.financial_data.as_ref(),
    );
    debug!(
        debts = payload.debts.len(),
        planned = response.plan.is_some(),
        "computed payoff plan"
    );
    json_response(StatusCode::OK, response)
}

async fn schedule_handler(body: Result<Json<SchedulePayload>, JsonRejection>) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match build_schedule_response(
        &payload.debts,
        payload.extra_payment,
        payload.strategy.into(),
    ) {
        Ok(response) => {
            debug!(months = response.summary.months, "computed payoff schedule");
            json_response(StatusCode::OK, response)
        }
        Err(msg) => {
            warn!(%msg, "rejected payoff schedule request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

/// Extractor failures get the same `{"error": ...}` body as handler errors.
fn rejection_response(status: StatusCode, detail: String) -> Response {
    warn!(%status, %detail, "rejected request");
    error_response(status, &detail)
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
