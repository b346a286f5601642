use std::{future::Future, io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    error::SweepError,
    sweep::SweepEngine,
    types::{ErrorResponse, SweepRequest},
};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<SweepEngine>,
    shutdown: CancellationToken, // cancelled on Ctrl+C; aborts in-flight sweeps
}

impl AppState {
    pub fn new(engine: SweepEngine, shutdown: CancellationToken) -> Self {
        Self {
            engine: Arc::new(engine),
            shutdown,
        }
    }
}

impl IntoResponse for SweepError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        let body = ErrorResponse {
            error: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// API routes plus a static-file fallback rooted at `ui_dir`.
pub fn router(state: AppState, ui_dir: impl Into<PathBuf>) -> Router {
    let api = Router::new()
        .route("/ping", post(post_ping))
        .with_state(state);

    let static_svc = ServeDir::new(ui_dir.into()).append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_svc)
        .layer(TraceLayer::new_for_http())
}

/// Serve until `state`'s shutdown token is cancelled.
pub async fn spawn_server(bind: &str, ui_dir: PathBuf, state: AppState) -> Result<()> {
    let shutdown = state.shutdown.clone();
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, ui = %ui_dir.display(), "serving");

    let app = router(state, ui_dir);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

/// Cancel `shutdown` once `signal` fires.
///
/// If the signal cannot be listened for, the token is left alone and this
/// never returns, so the server keeps running instead of stopping at startup.
pub async fn cancel_on_signal<F>(signal: F, shutdown: CancellationToken)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
    shutdown.cancel();
}

async fn post_ping(State(app): State<AppState>, body: Bytes) -> Response {
    let req = SweepRequest::from_json_lenient(&body);
    match app.engine.run(&req, &app.shutdown).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => {
            tracing::info!(ip = %req.ip, subnet = %req.subnet, error = %e, "sweep rejected");
            e.into_response()
        }
    }
}
