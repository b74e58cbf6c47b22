//! HTTP API tests driven through the router with `oneshot`

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use sales_agent_config::Settings;
use sales_agent_agent::InteractionLog;
use sales_agent_persistence::{IcpFileStore, InMemoryDealStore, JsonLinesInteractionStore};
use sales_agent_server::{create_router, AppState};

fn state() -> AppState {
    AppState::new(Settings::default(), Arc::new(InMemoryDealStore::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn saas_icp() -> Value {
    json!({
        "industry": "B2B SaaS",
        "size": {"min": 50.0, "max": 200.0},
        "revenue": {"min": 5000000.0, "max": 20000000.0},
        "persona_titles": ["VP Sales"]
    })
}

#[tokio::test]
async fn test_health() {
    let app = create_router(state());
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["deals"], 0);
}

#[tokio::test]
async fn test_score_lead() {
    let app = create_router(state());
    let lead = json!({
        "company_name": "DataFlow Inc.",
        "website": "https://dataflow.io",
        "industry": "B2B SaaS",
        "employees": {"min": 125.0, "max": 125.0},
        "revenue": {"min": 12000000.0, "max": 12000000.0},
        "location": "Denver, CO",
        "contacts": [{"name": "Dana Reyes", "title": "VP of Sales", "email": "dana@dataflow.io"}],
        "signals": ["hiring", "funding"]
    });

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads/score",
        Some(json!({"lead": lead, "icp": saas_icp()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "HOT");
    assert_eq!(body["company_fit"], 100);
}

#[tokio::test]
async fn test_score_lead_missing_industry_is_bad_request() {
    let app = create_router(state());
    let lead = json!({"company_name": "Nameless", "employees": {"min": 10.0, "max": 10.0}});
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads/score",
        Some(json!({"lead": lead, "icp": saas_icp()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn test_assess_icp() {
    let app = create_router(state());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/icp/assess",
        Some(json!({"industry": "Fintech"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["complete"], false);
    assert_eq!(body["market"]["breadth"], "very_broad");
}

#[tokio::test]
async fn test_deal_lifecycle_and_errors() {
    let app = create_router(state());

    let (status, deal) = send(
        &app,
        Method::POST,
        "/api/deals",
        Some(json!({"id": "DEAL-1", "customer_id": "CUST-1", "company_name": "Acme", "value": 50000.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(deal["stage"], "LEAD");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/deals",
        Some(json!({"id": "DEAL-1", "customer_id": "CUST-1", "value": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_id");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/deals/DEAL-1/advance",
        Some(json!({"stage": "PROPOSAL"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "illegal_transition");

    let (status, body) = send(&app, Method::POST, "/api/deals/DEAL-1/advance-next", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], "QUALIFICATION");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/deals/DEAL-1/close",
        Some(json!({"won": false, "reason": "went with a competitor"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], "CLOSED_LOST");

    let (status, body) = send(&app, Method::POST, "/api/deals/DEAL-1/advance-next", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "terminal_state");

    let (status, body) = send(&app, Method::GET, "/api/deals/DEAL-404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (_, body) = send(&app, Method::GET, "/api/deals/DEAL-1/interactions", None).await;
    assert_eq!(body.as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn test_turns_qualify_and_advance() {
    let app = create_router(state());
    send(
        &app,
        Method::POST,
        "/api/deals",
        Some(json!({"id": "DEAL-7", "customer_id": "CUST-7", "value": 20000.0})),
    )
    .await;
    send(&app, Method::POST, "/api/deals/DEAL-7/advance-next", None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/deals/DEAL-7/signals",
        Some(json!({"signals": ["budget-confirmed", "authority-confirmed", "need-confirmed"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 3);
    assert_eq!(body["recommendation"], "nurture");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/deals/DEAL-7/turns",
        Some(json!({"text": "We want this rolled out this quarter."})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"], "book_meeting");
    assert_eq!(body["transition"]["to"], "DISCOVERY");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/deals/DEAL-7/turns",
        Some(json!({"text": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pipeline_report() {
    let app = create_router(state());
    for (id, value) in [("DEAL-A", 100000.0), ("DEAL-B", 75000.0)] {
        send(
            &app,
            Method::POST,
            "/api/deals",
            Some(json!({"id": id, "customer_id": "CUST-1", "value": value})),
        )
        .await;
    }
    send(&app, Method::POST, "/api/deals/DEAL-B/advance-next", None).await;

    let (status, body) = send(&app, Method::GET, "/api/pipeline/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_deals"], 2);
    assert_eq!(body["total_value"], 175000.0);
    // 100k * 0.1 + 75k * 0.2
    assert_eq!(body["weighted_value"], 25000.0);
}

#[tokio::test]
async fn test_roi() {
    let app = create_router(state());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/roi",
        Some(json!({"investment": 12000.0, "hours_saved_per_day": 2.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monthly_savings"], 2000.0);
    assert_eq!(body["payback_months"], 6.0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/roi",
        Some(json!({"investment": -1.0, "hours_saved_per_day": 2.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_icp_routes_need_storage() {
    let app = create_router(state());
    let (status, body) = send(&app, Method::GET, "/api/icps", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "unavailable");

    let dir = tempfile::tempdir().unwrap();
    let app = create_router(state().with_icp_store(IcpFileStore::open(dir.path()).unwrap()));
    let (status, _) = send(&app, Method::PUT, "/api/icps/saas", Some(saas_icp())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, "/api/icps", None).await;
    assert_eq!(body, json!(["saas"]));

    let lead = json!({
        "company_name": "Acme",
        "industry": "B2B SaaS",
        "employees": {"min": 100.0, "max": 100.0}
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads/score",
        Some(json!({"lead": lead, "icp_id": "saas"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["composite"].as_u64().is_some());
}

#[tokio::test]
async fn test_unknown_icp_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(state().with_icp_store(IcpFileStore::open(dir.path()).unwrap()));

    let (status, body) = send(&app, Method::GET, "/api/icps/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let lead = json!({
        "company_name": "Acme",
        "industry": "B2B SaaS",
        "employees": {"min": 100.0, "max": 100.0}
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads/score",
        Some(json!({"lead": lead, "icp_id": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_inverted_employee_band_is_bad_request() {
    let app = create_router(state());
    let lead = json!({
        "company_name": "Acme",
        "industry": "B2B SaaS",
        "employees": {"min": 200.0, "max": 50.0}
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/leads/score",
        Some(json!({"lead": lead, "icp": saas_icp()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn test_interactions_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let deals = Arc::new(InMemoryDealStore::new());
    let boot = || {
        let store = Arc::new(JsonLinesInteractionStore::open(dir.path()).unwrap());
        let log = InteractionLog::with_store(store).unwrap();
        create_router(AppState::with_interaction_log(
            Settings::default(),
            deals.clone(),
            log,
        ))
    };

    let app = boot();
    send(
        &app,
        Method::POST,
        "/api/deals",
        Some(json!({"id": "DEAL-3", "customer_id": "CUST-3", "value": 5000.0})),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/deals/DEAL-3/interactions",
        Some(json!({"kind": "call", "summary": "discovery call", "sentiment": "positive"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let app = boot();
    let (status, body) = send(&app, Method::GET, "/api/deals/DEAL-3/interactions", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["summary"], "discovery call");
}

#[tokio::test]
async fn test_metrics_without_recorder_is_unavailable() {
    let app = create_router(state());
    let (status, _) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
