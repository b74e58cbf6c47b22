//! HTTP Endpoints
//!
//! REST API over lead scoring, ICP assessment and the deal pipeline.

use axum::{
    extract::{MatchedPath, Path, Query, Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sales_agent_agent::{rank_leads, PipelineReport, RankedLead, RoiReport, StageTransition};
use sales_agent_core::{
    BantSignal, BantStatus, CompanyProfile, Deal, DealId, Icp, Interaction, InteractionType,
    MarketEstimate, PipelineStage, Recommendation, ScoreBreakdown, Sentiment,
};

use crate::metrics::{metrics_handler, record_request, record_score, record_transition};
use crate::state::AppState;
use crate::ServerError;

const DEFAULT_RANK_LIMIT: usize = 10;
const DEFAULT_RECENT_LIMIT: usize = 50;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        // Leads and ICPs
        .route("/api/leads/score", post(score_lead))
        .route("/api/leads/rank", post(rank))
        .route("/api/icp/assess", post(assess_icp))
        .route("/api/icps", get(list_icps))
        .route("/api/icps/:id", get(get_icp).put(save_icp))
        // Deals
        .route("/api/deals", post(create_deal).get(list_deals))
        .route("/api/deals/:id", get(get_deal))
        .route("/api/deals/:id/advance", post(advance))
        .route("/api/deals/:id/advance-next", post(advance_next))
        .route("/api/deals/:id/close", post(close))
        .route("/api/deals/:id/value", post(update_value))
        .route("/api/deals/:id/signals", post(apply_signals))
        .route("/api/deals/:id/turns", post(process_turn))
        .route(
            "/api/deals/:id/interactions",
            get(list_interactions).post(record_interaction),
        )
        .route("/api/customers/:id/interactions", get(customer_interactions))
        .route("/api/pipeline/report", get(report))
        .route("/api/roi", post(roi))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty or all invalid, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];
    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

async fn track_requests(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();
    let response = next.run(req).await;
    record_request(&route, response.status().as_u16(), start.elapsed());
    response
}

// ---------------------------------------------------------------------------
// Leads and ICPs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    lead: CompanyProfile,
    #[serde(default)]
    icp: Option<Icp>,
    /// Saved ICP to score against when `icp` is absent
    #[serde(default)]
    icp_id: Option<String>,
}

fn resolve_icp(state: &AppState, icp: Option<Icp>, icp_id: Option<&str>) -> Result<Icp, ServerError> {
    if let Some(icp) = icp {
        return Ok(icp);
    }
    let id = icp_id.ok_or_else(|| ServerError::InvalidRequest("either icp or icp_id is required".into()))?;
    let store = state
        .icps
        .as_ref()
        .ok_or_else(|| ServerError::Unavailable("ICP storage is not configured".into()))?;
    store
        .load(id)?
        .ok_or_else(|| ServerError::NotFound(format!("ICP {}", id)))
}

async fn score_lead(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreBreakdown>, ServerError> {
    let icp = resolve_icp(&state, req.icp, req.icp_id.as_deref())?;
    let score = state.engine.score(&req.lead, &icp)?;
    record_score(score.tier, score.composite);
    Ok(Json(score))
}

#[derive(Debug, Deserialize)]
struct RankRequest {
    leads: Vec<CompanyProfile>,
    #[serde(default)]
    icp: Option<Icp>,
    #[serde(default)]
    icp_id: Option<String>,
    #[serde(default)]
    max_results: Option<usize>,
}

async fn rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<Vec<RankedLead>>, ServerError> {
    let icp = resolve_icp(&state, req.icp, req.icp_id.as_deref())?;
    let max = req.max_results.unwrap_or(DEFAULT_RANK_LIMIT);
    let ranked = rank_leads(&state.engine, req.leads, &icp, max)?;
    for entry in &ranked {
        record_score(entry.score.tier, entry.score.composite);
    }
    Ok(Json(ranked))
}

#[derive(Debug, Serialize)]
struct IcpAssessment {
    valid: bool,
    complete: bool,
    missing_fields: Vec<&'static str>,
    market: MarketEstimate,
}

async fn assess_icp(Json(icp): Json<Icp>) -> Json<IcpAssessment> {
    Json(IcpAssessment {
        valid: icp.validate().is_ok(),
        complete: icp.is_complete(),
        missing_fields: icp.missing_fields(),
        market: icp.market_estimate(),
    })
}

fn icp_store(state: &AppState) -> Result<&sales_agent_persistence::IcpFileStore, ServerError> {
    state
        .icps
        .as_ref()
        .ok_or_else(|| ServerError::Unavailable("ICP storage is not configured".into()))
}

async fn list_icps(State(state): State<AppState>) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(icp_store(&state)?.list()?))
}

async fn get_icp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Icp>, ServerError> {
    icp_store(&state)?
        .load(&id)?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("ICP {}", id)))
}

async fn save_icp(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(icp): Json<Icp>,
) -> Result<StatusCode, ServerError> {
    icp.validate()?;
    icp_store(&state)?.save(&id, &icp)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Deals
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreateDealRequest {
    #[serde(default)]
    id: Option<String>,
    customer_id: String,
    #[serde(default)]
    company_name: String,
    value: f64,
}

async fn create_deal(
    State(state): State<AppState>,
    Json(req): Json<CreateDealRequest>,
) -> Result<(StatusCode, Json<Deal>), ServerError> {
    let deal = match req.id {
        Some(id) => {
            let deal = Deal::new(DealId::from(id), req.customer_id, req.company_name, req.value)?;
            state.manager.add_deal(deal.clone())?;
            deal
        }
        None => state
            .manager
            .create_deal(req.customer_id, req.company_name, req.value)?,
    };
    Ok((StatusCode::CREATED, Json(deal)))
}

#[derive(Debug, Deserialize)]
struct DealFilter {
    customer_id: Option<String>,
    stage: Option<PipelineStage>,
}

async fn list_deals(
    State(state): State<AppState>,
    Query(filter): Query<DealFilter>,
) -> Result<Json<Vec<Deal>>, ServerError> {
    let deals = match &filter.customer_id {
        Some(customer) => state.manager.deals_for_customer(customer)?,
        None => state.manager.list()?,
    };
    let deals = match filter.stage {
        Some(stage) => deals.into_iter().filter(|d| d.stage() == stage).collect(),
        None => deals,
    };
    Ok(Json(deals))
}

async fn get_deal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deal>, ServerError> {
    Ok(Json(state.manager.get(&DealId::from(id))?))
}

#[derive(Debug, Deserialize)]
struct AdvanceRequest {
    stage: PipelineStage,
    #[serde(default)]
    note: Option<String>,
}

async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<StageTransition>, ServerError> {
    let transition = state
        .manager
        .advance_with_note(&DealId::from(id), req.stage, req.note)?;
    record_transition(transition.from, transition.to);
    Ok(Json(transition))
}

async fn advance_next(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StageTransition>, ServerError> {
    let transition = state.manager.advance_next(&DealId::from(id))?;
    record_transition(transition.from, transition.to);
    Ok(Json(transition))
}

#[derive(Debug, Deserialize)]
struct CloseRequest {
    won: bool,
    #[serde(default)]
    reason: Option<String>,
}

async fn close(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CloseRequest>,
) -> Result<Json<StageTransition>, ServerError> {
    let transition = state.manager.close(&DealId::from(id), req.won, req.reason)?;
    record_transition(transition.from, transition.to);
    Ok(Json(transition))
}

#[derive(Debug, Deserialize)]
struct ValueRequest {
    value: f64,
}

async fn update_value(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ValueRequest>,
) -> Result<Json<Deal>, ServerError> {
    Ok(Json(state.manager.update_value(&DealId::from(id), req.value)?))
}

#[derive(Debug, Deserialize)]
struct SignalsRequest {
    signals: Vec<BantSignal>,
}

#[derive(Debug, Serialize)]
struct SignalsResponse {
    status: BantStatus,
    score: u8,
    recommendation: Recommendation,
}

async fn apply_signals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SignalsRequest>,
) -> Result<Json<SignalsResponse>, ServerError> {
    let status = state.manager.qualify_all(&DealId::from(id), &req.signals)?;
    Ok(Json(SignalsResponse {
        score: status.score(),
        recommendation: sales_agent_agent::recommend(&status),
        status,
    }))
}

#[derive(Debug, Deserialize)]
struct TurnRequest {
    text: String,
}

async fn process_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TurnRequest>,
) -> Result<impl IntoResponse, ServerError> {
    if req.text.trim().is_empty() {
        return Err(ServerError::InvalidRequest("text must not be empty".into()));
    }
    let outcome = state
        .conversation
        .process_turn(&DealId::from(id), &req.text)
        .await?;
    if let Some(transition) = &outcome.transition {
        record_transition(transition.from, transition.to);
    }
    Ok(Json(outcome))
}

async fn list_interactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Interaction>>, ServerError> {
    let deal = state.manager.get(&DealId::from(id))?;
    Ok(Json(state.interactions.for_deal(&deal.id)))
}

#[derive(Debug, Deserialize)]
struct InteractionRequest {
    kind: InteractionType,
    summary: String,
    #[serde(default)]
    sentiment: Sentiment,
}

async fn record_interaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<InteractionRequest>,
) -> Result<(StatusCode, Json<Interaction>), ServerError> {
    let deal = state.manager.get(&DealId::from(id))?;
    let recorded = state.interactions.record(
        Interaction::new(deal.customer_id, req.kind, req.summary)
            .for_deal(deal.id)
            .with_sentiment(req.sentiment),
    )?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

async fn customer_interactions(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    Query(query): Query<RecentQuery>,
) -> Json<serde_json::Value> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Json(serde_json::json!({
        "recent": state.interactions.recent(&customer_id, limit),
        "stats": state.interactions.stats(&customer_id),
    }))
}

async fn report(State(state): State<AppState>) -> Result<Json<PipelineReport>, ServerError> {
    Ok(Json(state.manager.report()?))
}

#[derive(Debug, Deserialize)]
struct RoiRequest {
    investment: f64,
    hours_saved_per_day: f64,
    #[serde(default)]
    hourly_rate: Option<f64>,
}

async fn roi(
    State(state): State<AppState>,
    Json(req): Json<RoiRequest>,
) -> Result<Json<RoiReport>, ServerError> {
    Ok(Json(state.roi.calculate(
        req.investment,
        req.hours_saved_per_day,
        req.hourly_rate,
    )?))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.manager.list() {
        Ok(deals) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "environment": format!("{:?}", state.settings.environment).to_lowercase(),
                "deals": deals.len(),
                "metrics": state.metrics.is_some(),
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                })),
            )
        }
    }
}
