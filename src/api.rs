//! REST API surface around the scheduling pipeline (spec.md §5's
//! "(ambient) Serving model"). `POST /schedules` runs the pipeline
//! synchronously to completion before responding — no background job
//! streaming, unlike the teacher's `rayon::spawn` + `tokio::mpsc` setup,
//! since spec.md §5 mandates a single-threaded synchronous pipeline.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::demo_data::{self, DemoData};
use crate::dto::{ScheduleRequestDto, ScheduleResponseDto};
use crate::error::SchedulerError;

/// Application state shared across handlers.
pub struct AppState {
    schedules: RwLock<HashMap<String, ScheduleResponseDto>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            schedules: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/demo-data", get(list_demo_data))
        .route("/demo-data/{id}", get(get_demo_data))
        .route("/schedules", post(create_schedule))
        .route("/schedules/{id}", get(get_schedule))
        .with_state(state)
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub solver_engine: &'static str,
}

/// GET /info
async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "nurse-roster-scheduler",
        version: env!("CARGO_PKG_VERSION"),
        solver_engine: "selen",
    })
}

/// GET /demo-data
async fn list_demo_data() -> Json<Vec<&'static str>> {
    Json(demo_data::list_demo_data())
}

/// GET /demo-data/{id}
async fn get_demo_data(Path(id): Path<String>) -> Result<Json<ScheduleResponseDto>, StatusCode> {
    let demo = id.parse::<DemoData>().map_err(|_| StatusCode::NOT_FOUND)?;
    let (config, requests) = demo_data::generate(demo);
    let outcome = crate::solver::solve(&config, &requests).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    Ok(Json(ScheduleResponseDto::from_roster(&outcome.roster, &outcome.warnings)))
}

/// POST /schedules — runs the pipeline synchronously and stores the
/// result under a fresh id.
async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<ScheduleRequestDto>,
) -> Result<Json<String>, SchedulerError> {
    let mut config = SchedulerConfig::clinic();
    if let Some(seed) = dto.seed {
        config = config.with_seed(seed);
    }

    let requests = if let Some(csv_text) = &dto.requests_csv {
        crate::requests::parse_requests(csv_text)?
    } else {
        dto.requests
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.to_domain())
            .collect()
    };

    let outcome = crate::solver::solve(&config, &requests)?;
    let response = ScheduleResponseDto::from_roster(&outcome.roster, &outcome.warnings);

    let id = Uuid::new_v4().to_string();
    state.schedules.write().insert(id.clone(), response);

    Ok(Json(id))
}

/// GET /schedules/{id}
async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResponseDto>, StatusCode> {
    state
        .schedules
        .read()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
