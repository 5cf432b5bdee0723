// http server - the codeguard api surface

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{Archive, Error, Gemini};

const LOGGED_STATUS: &str = "Logged to Cloud Archive";
const OFFLINE_STATUS: &str = "DB Offline (Local Session Only)";

struct AppState {
    gemini: Option<Gemini>,
    archive: Option<Archive>,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    code: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    audit_report: String,
    db_status: &'static str,
}

#[derive(Serialize)]
struct HistoryEntry {
    id: String,
    code: String,
    report: String,
    time: Option<String>,
}

#[derive(Serialize)]
struct HistoryResponse {
    history: Vec<HistoryEntry>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the api router. Either client can be absent, the affected
/// endpoints degrade per-request instead of failing startup.
pub fn router(gemini: Option<Gemini>, archive: Option<Archive>) -> Router {
    let state = Arc::new(AppState { gemini, archive });
    router_with_state(state)
}

fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/analyze", post(analyze))
        .route("/history", get(history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct Server;

impl Server {
    pub async fn run(
        gemini: Option<Gemini>,
        archive: Option<Archive>,
        host: &str,
        port: u16,
    ) -> Result<(), Error> {
        let state = Arc::new(AppState { gemini, archive });
        let app = router_with_state(state.clone());

        let addr = format!("{host}:{port}");
        tracing::info!("server running at http://{addr}");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        // drain the pool once the listener is gone
        if let Some(archive) = &state.archive {
            archive.close().await;
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(e) => {
            // no signal handler means no clean shutdown, but keep serving
            tracing::error!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "message": "CodeGuard SEC-OPS API is active",
        "engine": "Gemini 2.5 Flash",
    }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    // no key, no audit - the request never reaches gemini
    let Some(gemini) = &state.gemini else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": Error::MissingApiKey.to_string() })),
        )
            .into_response();
    };

    match run_audit(gemini, state.archive.as_ref(), &req.code).await {
        Ok(body) => Json(body).into_response(),
        // runtime failures stay in-band as a 200 with an error field
        Err(e) => {
            tracing::warn!(error = %e, "audit failed");
            Json(ErrorResponse {
                error: e.to_string(),
            })
            .into_response()
        }
    }
}

async fn run_audit(
    gemini: &Gemini,
    archive: Option<&Archive>,
    code: &str,
) -> Result<AnalyzeResponse, Error> {
    let report = gemini.audit(code).await?;

    // an insert failure takes the finished report down with it
    let db_status = match archive {
        Some(archive) => {
            archive.insert(code, &report).await?;
            LOGGED_STATUS
        }
        None => OFFLINE_STATUS,
    };

    Ok(AnalyzeResponse {
        audit_report: report,
        db_status,
    })
}

async fn history(State(state): State<Arc<AppState>>) -> Response {
    // never enabled means empty, not an error
    let Some(archive) = &state.archive else {
        return Json(HistoryResponse { history: vec![] }).into_response();
    };

    match archive.recent().await {
        Ok(records) => Json(HistoryResponse {
            history: records
                .into_iter()
                .map(|r| HistoryEntry {
                    id: r.id.to_string(),
                    code: r.code,
                    report: r.report,
                    time: r.created_at,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "history query failed");
            Json(ErrorResponse {
                error: e.to_string(),
            })
            .into_response()
        }
    }
}
