// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use rubric_core::RubricError;
use rubric_grading::Worker;
use rubric_helpdesk::HelpdeskClient;
use rubric_storage::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{CronAuth, cron_auth_middleware};
use crate::handlers;

/// Queueing policy applied by the webhook handler.
#[derive(Debug, Clone, Copy)]
pub struct QueuePolicy {
    /// Hours between ticket close and grading. 0 means immediate.
    pub delay_hours: u32,
    /// Window within which a re-closed ticket is not re-graded.
    pub recent_window_days: u32,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Evaluation and queue storage.
    pub db: Database,
    /// Helpdesk client; `None` when credentials are not configured, in
    /// which case webhooks are queued without enrichment.
    pub helpdesk: Option<HelpdeskClient>,
    /// Queue worker, invoked by the trigger endpoint.
    pub worker: Worker,
    /// Webhook queueing policy.
    pub policy: QueuePolicy,
}

/// Gateway server configuration (mirrors GatewayConfig from rubric-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Bearer secret for the trigger endpoint (None = check disabled).
    pub cron_secret: Option<String>,
}

/// Build the gateway router.
///
/// Routes:
/// - POST|GET /webhook -- ticket-closed intake + verification
/// - GET|POST /process -- worker trigger, guarded by the cron secret
/// - GET /evaluations -- widget summary, permissive CORS
/// - GET /health
pub fn build_router(state: GatewayState, cron_secret: Option<String>) -> Router {
    let open_routes = Router::new()
        .route(
            "/webhook",
            post(handlers::post_webhook).get(handlers::get_webhook),
        )
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let trigger_routes = Router::new()
        .route(
            "/process",
            get(handlers::process_queue).post(handlers::process_queue),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            CronAuth {
                secret: cron_secret,
            },
            cron_auth_middleware,
        ))
        .with_state(state.clone());

    // The widget is served from the helpdesk's origin, so this route must
    // answer cross-origin requests.
    let widget_routes = Router::new()
        .route("/evaluations", get(handlers::get_evaluations))
        .layer(CorsLayer::permissive())
        .with_state(state);

    Router::new()
        .merge(open_routes)
        .merge(trigger_routes)
        .merge(widget_routes)
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server and serve until shutdown.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), RubricError> {
    let app = build_router(state, config.cron_secret.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RubricError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| RubricError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
