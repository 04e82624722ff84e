use axum::{
    Router,
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::core::{
    Debt, Milestone, SimulationError, SimulationResult, SolveConfig, Strategy, compare_strategies,
    milestones, simulate, solve_extra_payment, validate_inputs,
};
use crate::report::{self, ReportInput};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(alias = "Snowball", alias = "smallestBalance", alias = "smallest-balance")]
    Snowball,
    #[serde(alias = "Avalanche", alias = "highestRate", alias = "highest-rate")]
    Avalanche,
}

impl From<ApiStrategy> for Strategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Snowball => Strategy::Snowball,
            ApiStrategy::Avalanche => Strategy::Avalanche,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    debts: Vec<Debt>,
    extra_payment: Option<f64>,
    strategy: Option<ApiStrategy>,
    horizon_months: Option<u32>,
    target_months: Option<u32>,
    search_max: Option<f64>,
    display_name: Option<String>,
}

#[derive(Debug)]
struct PlanRequest {
    debts: Vec<Debt>,
    extra_payment: f64,
    strategy: Strategy,
    horizon_months: u32,
    target_months: Option<u32>,
    search_max: Option<f64>,
    display_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    result: SimulationResult,
    milestones: Vec<Milestone>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

struct AppState {
    config: AppConfig,
}

pub fn router(config: AppConfig) -> Router {
    let state = Arc::new(AppState { config });
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate", post(simulate_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/solve", post(solve_handler))
        .route("/api/report", post(report_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: AppConfig) -> std::io::Result<()> {
    let port = config.server.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(config);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Payoff HTTP API listening on http://{addr}");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    let request = match plan_request_from_payload(payload, &state.config) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match simulate(
        &request.debts,
        request.extra_payment,
        request.strategy,
        request.horizon_months,
    ) {
        Ok(result) => json_response(StatusCode::OK, build_simulate_response(result)),
        Err(err) => simulation_error_response(err),
    }
}

async fn compare_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    let request = match plan_request_from_payload(payload, &state.config) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match compare_strategies(&request.debts, request.extra_payment, request.horizon_months) {
        Ok(comparison) => json_response(StatusCode::OK, comparison),
        Err(err) => simulation_error_response(err),
    }
}

async fn solve_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    let request = match plan_request_from_payload(payload, &state.config) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let Some(target_months) = request.target_months else {
        return error_response(StatusCode::BAD_REQUEST, "targetMonths is required");
    };

    let mut config = SolveConfig::new(request.strategy, target_months, request.horizon_months);
    if let Some(search_max) = request.search_max {
        config.search_max = search_max;
    }
    match solve_extra_payment(&request.debts, config) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(err) => simulation_error_response(err),
    }
}

async fn report_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    let request = match plan_request_from_payload(payload, &state.config) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let comparison =
        match compare_strategies(&request.debts, request.extra_payment, request.horizon_months) {
            Ok(comparison) => comparison,
            Err(err) => return simulation_error_response(err),
        };
    let document = report::render(&ReportInput {
        title: &state.config.report.title,
        display_name: &request.display_name,
        debts: &request.debts,
        extra_payment: request.extra_payment,
        comparison: &comparison,
    });
    pdf_response(document.to_pdf())
}

fn plan_request_from_payload(
    payload: PlanPayload,
    config: &AppConfig,
) -> Result<PlanRequest, String> {
    let extra_payment = payload
        .extra_payment
        .unwrap_or(config.simulation.default_extra_payment);
    let horizon_months = payload
        .horizon_months
        .unwrap_or(config.simulation.horizon_months);

    if horizon_months == 0 || horizon_months > config.simulation.horizon_months {
        return Err(format!(
            "horizonMonths must be between 1 and {}",
            config.simulation.horizon_months
        ));
    }
    if let Some(target) = payload.target_months {
        if target == 0 || target > horizon_months {
            return Err(format!(
                "targetMonths must be between 1 and {horizon_months}"
            ));
        }
    }
    if let Some(search_max) = payload.search_max {
        if !search_max.is_finite() || search_max <= 0.0 {
            return Err("searchMax must be > 0".to_string());
        }
    }
    validate_inputs(&payload.debts, extra_payment, horizon_months).map_err(|e| e.to_string())?;

    Ok(PlanRequest {
        debts: payload.debts,
        extra_payment,
        strategy: payload.strategy.map(Strategy::from).unwrap_or(Strategy::Snowball),
        horizon_months,
        target_months: payload.target_months,
        search_max: payload.search_max,
        display_name: payload.display_name.unwrap_or_default(),
    })
}

#[cfg(test)]
fn plan_request_from_json(json: &str, config: &AppConfig) -> Result<PlanRequest, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    plan_request_from_payload(payload, config)
}

fn build_simulate_response(result: SimulationResult) -> SimulateResponse {
    let milestones = milestones(&result);
    SimulateResponse { result, milestones }
}

fn simulation_error_response(err: SimulationError) -> Response {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    tracing::warn!(%err, "simulation request rejected");
    error_response(status, &err.to_string())
}

fn no_store(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    no_store((status, Json(body)).into_response())
}

fn pdf_response(bytes: Vec<u8>) -> Response {
    no_store(
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"payoff-plan.pdf\"",
                ),
            ],
            bytes,
        )
            .into_response(),
    )
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
