//! HTTP endpoint for repository sync: `POST /api/github/sync`.
//!
//! Body `{token, owner, repo}`. Each run happens on the blocking pool; runs
//! are independent and cannot be cancelled once started.

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::HttpTransport;
use crate::sync::{SyncOptions, SyncReport, SyncRequest, SyncWorker};

pub const SYNC_PATH: &str = "/api/github/sync";

/// Shared, read-only state for every request.
#[derive(Clone)]
pub struct SyncState {
    pub transport: Arc<dyn HttpTransport>,
    pub options: SyncOptions,
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct SyncResponse {
    success: bool,
    message: String,
    #[serde(flatten)]
    report: SyncReport,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type Reply = (StatusCode, Json<serde_json::Value>);

fn reply<T: Serialize>(status: StatusCode, body: T) -> Reply {
    let value = serde_json::to_value(body)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
    (status, Json(value))
}

fn error_reply(status: StatusCode, error: impl Into<String>) -> Reply {
    reply(
        status,
        ErrorResponse {
            error: error.into(),
        },
    )
}

pub fn router(state: SyncState) -> Router {
    Router::new()
        .route(SYNC_PATH, post(sync_handler))
        .with_state(Arc::new(state))
}

async fn sync_handler(
    State(state): State<Arc<SyncState>>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> Reply {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => return error_reply(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if let Err(e) = request.validate() {
        return error_reply(StatusCode::BAD_REQUEST, e.to_string());
    }
    tracing::info!(owner = %request.owner, repo = %request.repo, "sync requested");

    let worker = SyncWorker::new(Arc::clone(&state.transport), state.options.clone());
    let root = state.project_root.clone();
    let (owner, repo) = (request.owner.clone(), request.repo.clone());
    let outcome = tokio::task::spawn_blocking(move || worker.sync(&request, &root)).await;

    match outcome {
        Ok(Ok(report)) => reply(
            StatusCode::OK,
            SyncResponse {
                success: true,
                message: report.summary(owner.trim(), repo.trim()),
                report,
            },
        ),
        Ok(Err(e)) if e.is_invalid_request() => error_reply(StatusCode::BAD_REQUEST, e.to_string()),
        Ok(Err(e)) => {
            tracing::error!("sync failed: {}", e);
            error_reply(StatusCode::BAD_GATEWAY, e.to_string())
        }
        Err(join) => {
            tracing::error!("sync task panicked: {}", join);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "sync task failed")
        }
    }
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: &str, state: SyncState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, path = SYNC_PATH, "sync endpoint listening");
    axum::serve(listener, router(state))
        .await
        .context("http server")?;
    Ok(())
}
