//! Prometheus metrics
//!
//! Counters and histograms are recorded through the `metrics` facade and
//! rendered by the Prometheus exporter at `/metrics`.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sales_agent_core::{PipelineStage, Tier};
use std::time::Duration;

use crate::state::AppState;
use crate::ServerError;

/// Install the global Prometheus recorder
///
/// Returns `None` when a recorder is already installed for this process.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    }
}

pub fn record_request(route: &str, status: u16, elapsed: Duration) {
    counter!(
        "sales_agent_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("sales_agent_request_duration_seconds", "route" => route.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_error(kind: &'static str) {
    counter!("sales_agent_errors_total", "kind" => kind).increment(1);
}

pub fn record_transition(from: PipelineStage, to: PipelineStage) {
    counter!(
        "sales_agent_stage_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

pub fn record_score(tier: Tier, composite: u32) {
    counter!("sales_agent_leads_scored_total", "tier" => tier.as_str()).increment(1);
    histogram!("sales_agent_lead_composite_score").record(composite as f64);
}

pub(crate) async fn metrics_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ServerError::Unavailable("metrics exporter is not installed".into()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
