use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Liveness probe
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_snapshot())
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let counters = [
        ("signups", "Accounts created", m.signups),
        ("signins", "Successful signins", m.signins),
        ("signin_failures", "Rejected signins", m.signin_failures),
        ("auth_rejections", "Requests rejected by token auth", m.auth_rejections),
        ("contents_created", "Content items created", m.contents_created),
        ("contents_updated", "Content items updated", m.contents_updated),
        ("contents_deleted", "Content items deleted", m.contents_deleted),
        ("shares_created", "Share links created", m.shares_created),
        ("share_views", "Shared collections viewed", m.share_views),
    ];

    let mut body = String::new();
    for (name, help, value) in counters {
        body.push_str(&format!(
            "# HELP brainvault_{name} {help}\n# TYPE brainvault_{name} counter\nbrainvault_{name} {value}\n"
        ));
    }
    body.push_str(&format!(
        "# HELP brainvault_uptime_seconds Uptime seconds\n# TYPE brainvault_uptime_seconds gauge\nbrainvault_uptime_seconds {}\n",
        m.uptime_seconds
    ));
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
