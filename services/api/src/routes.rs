use crate::infra::{deserialize_optional_rate, deserialize_rate, AppState, SharedPlanner};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use mvp_planner::catalog::ClinicianQuery;
use mvp_planner::domain::{Clinician, MeasureId, Npi, TrackId};
use mvp_planner::error::AppError;
use mvp_planner::planning::{
    PlanStats, PlanSummary, ScenarioSummary, TrackReduction, TrackSummary,
};
use mvp_planner::scoring::DecileScore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) measure_id: String,
    #[serde(default)]
    pub(crate) collection_type: Option<String>,
    #[serde(deserialize_with = "deserialize_rate")]
    pub(crate) rate: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) measure_id: MeasureId,
    pub(crate) collection_type: String,
    pub(crate) rate: f64,
    #[serde(flatten)]
    pub(crate) score: DecileScore,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignRequest {
    pub(crate) npis: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectMeasureRequest {
    pub(crate) measure_id: String,
    #[serde(default)]
    pub(crate) collection_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_rate")]
    pub(crate) estimated_rate: Option<f64>,
    #[serde(default)]
    pub(crate) difficulty: Option<String>,
    #[serde(default)]
    pub(crate) readiness: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PerformanceRequest {
    pub(crate) measure_id: String,
    pub(crate) npi: String,
    #[serde(deserialize_with = "deserialize_rate")]
    pub(crate) rate: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogStatsResponse {
    #[serde(flatten)]
    pub(crate) stats: PlanStats,
    pub(crate) specialties: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrackScoreResponse {
    #[serde(flatten)]
    pub(crate) summary: TrackSummary,
    pub(crate) overall_average: f64,
}

/// Planning API bound to one shared session.
pub(crate) fn planner_router(planner: SharedPlanner) -> Router {
    Router::new()
        .route("/api/v1/catalog/stats", get(catalog_stats))
        .route("/api/v1/clinicians", get(unassigned_clinicians))
        .route("/api/v1/score", post(score_rate))
        .route("/api/v1/tracks/:track/clinicians", post(assign_clinicians))
        .route(
            "/api/v1/tracks/:track/clinicians/:npi",
            delete(unassign_clinician),
        )
        .route("/api/v1/tracks/:track/measures", post(select_measure))
        .route(
            "/api/v1/tracks/:track/measures/:measure",
            delete(deselect_measure),
        )
        .route("/api/v1/tracks/:track/performance", post(record_performance))
        .route("/api/v1/tracks/:track/score", get(track_score))
        .route("/api/v1/plan/summary", get(plan_summary))
        .route("/api/v1/plan/export", get(plan_export))
        .route("/api/v1/scenarios", get(list_scenarios))
        .route(
            "/api/v1/scenarios/:name",
            post(save_scenario).delete(delete_scenario),
        )
        .route("/api/v1/scenarios/:name/restore", post(restore_scenario))
        .with_state(planner)
}

/// Planning routes plus the operational endpoints.
pub(crate) fn with_planner_routes(planner: SharedPlanner) -> Router {
    planner_router(planner)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
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

pub(crate) async fn catalog_stats(State(planner): State<SharedPlanner>) -> Json<CatalogStatsResponse> {
    let planner = planner.lock().await;
    Json(CatalogStatsResponse {
        stats: planner.stats(),
        specialties: planner.catalog().specialty_counts(),
    })
}

pub(crate) async fn unassigned_clinicians(
    State(planner): State<SharedPlanner>,
    Query(query): Query<ClinicianQuery>,
) -> Json<Vec<Clinician>> {
    let planner = planner.lock().await;
    Json(
        planner
            .unassigned_clinicians(&query)
            .into_iter()
            .cloned()
            .collect(),
    )
}

pub(crate) async fn score_rate(
    State(planner): State<SharedPlanner>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let planner = planner.lock().await;
    let measure_id = MeasureId::from(request.measure_id);
    let collection_type = request
        .collection_type
        .unwrap_or_else(|| planner.catalog().default_collection_type(&measure_id).to_string());
    let rate = request.rate;
    let score = planner.score(&measure_id, &collection_type, rate);

    Json(ScoreResponse {
        measure_id,
        collection_type,
        rate,
        score,
    })
}

pub(crate) async fn assign_clinicians(
    State(planner): State<SharedPlanner>,
    Path(track): Path<String>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<TrackSummary>, AppError> {
    let npis: Vec<Npi> = request.npis.into_iter().map(Npi::from).collect();
    let mut planner = planner.lock().await;
    let summary = planner.assign_many(&npis, &TrackId::from(track))?;
    Ok(Json(summary))
}

pub(crate) async fn unassign_clinician(
    State(planner): State<SharedPlanner>,
    Path((track, npi)): Path<(String, String)>,
) -> Result<Json<TrackSummary>, AppError> {
    let mut planner = planner.lock().await;
    let summary = planner.unassign_from(&TrackId::from(track), &Npi::from(npi))?;
    Ok(Json(summary))
}

pub(crate) async fn select_measure(
    State(planner): State<SharedPlanner>,
    Path(track): Path<String>,
    Json(request): Json<SelectMeasureRequest>,
) -> Result<Json<TrackSummary>, AppError> {
    let track = TrackId::from(track);
    let measure_id = MeasureId::from(request.measure_id);
    let mut planner = planner.lock().await;

    let mut summary =
        planner.select_measure(&track, &measure_id, request.collection_type.as_deref())?;
    if let Some(rate) = request.estimated_rate {
        summary = planner.set_estimate(&track, &measure_id, Some(rate))?;
    }
    if request.difficulty.is_some() || request.readiness.is_some() {
        summary = planner.annotate_selection(
            &track,
            &measure_id,
            request.difficulty,
            request.readiness,
        )?;
    }
    Ok(Json(summary))
}

pub(crate) async fn deselect_measure(
    State(planner): State<SharedPlanner>,
    Path((track, measure)): Path<(String, String)>,
) -> Result<Json<TrackSummary>, AppError> {
    let mut planner = planner.lock().await;
    let summary = planner.deselect_measure(&TrackId::from(track), &MeasureId::from(measure))?;
    Ok(Json(summary))
}

pub(crate) async fn record_performance(
    State(planner): State<SharedPlanner>,
    Path(track): Path<String>,
    Json(request): Json<PerformanceRequest>,
) -> Result<Json<TrackSummary>, AppError> {
    let mut planner = planner.lock().await;
    let summary = planner.record_performance(
        &TrackId::from(track),
        &MeasureId::from(request.measure_id),
        &Npi::from(request.npi),
        request.rate,
    )?;
    Ok(Json(summary))
}

pub(crate) async fn track_score(
    State(planner): State<SharedPlanner>,
    Path(track): Path<String>,
) -> Json<TrackScoreResponse> {
    let planner = planner.lock().await;
    Json(TrackScoreResponse {
        summary: planner.track_summary(&TrackId::from(track)),
        overall_average: planner.overall_score(TrackReduction::Average),
    })
}

pub(crate) async fn plan_summary(State(planner): State<SharedPlanner>) -> Json<PlanSummary> {
    Json(planner.lock().await.summary())
}

pub(crate) async fn plan_export(State(planner): State<SharedPlanner>) -> impl IntoResponse {
    let export = planner.lock().await.export(Utc::now());
    let disposition = format!("attachment; filename=\"{}\"", export.file_name());
    (
        StatusCode::OK,
        [(header::CONTENT_DISPOSITION, disposition)],
        Json(export),
    )
}

pub(crate) async fn list_scenarios(
    State(planner): State<SharedPlanner>,
) -> Result<Json<Vec<ScenarioSummary>>, AppError> {
    let scenarios = planner.lock().await.list_scenarios()?;
    Ok(Json(scenarios))
}

pub(crate) async fn save_scenario(
    State(planner): State<SharedPlanner>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<ScenarioSummary>), AppError> {
    let summary = planner.lock().await.save_scenario(&name, Utc::now())?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub(crate) async fn restore_scenario(
    State(planner): State<SharedPlanner>,
    Path(name): Path<String>,
) -> Result<Json<PlanSummary>, AppError> {
    let summary = planner.lock().await.restore_scenario(&name)?;
    Ok(Json(summary))
}

pub(crate) async fn delete_scenario(
    State(planner): State<SharedPlanner>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    planner.lock().await.delete_scenario(&name)?;
    Ok(StatusCode::NO_CONTENT)
}
