// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token guard for the worker trigger endpoint.
//!
//! The cron secret is optional: when unset, /process is open, which is the
//! expected setup behind a private network. When set, the trigger must
//! carry `Authorization: Bearer <secret>`.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::handlers::ErrorResponse;

/// Shared state for the cron auth middleware.
#[derive(Debug, Clone)]
pub struct CronAuth {
    /// Expected secret; `None` disables the check.
    pub secret: Option<String>,
}

/// Middleware enforcing the cron secret on trigger routes.
pub async fn cron_auth_middleware(
    State(auth): State<CronAuth>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(secret) = &auth.secret {
        let expected = format!("Bearer {secret}");
        let presented = request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if presented != expected {
            warn!("unauthorized worker trigger request");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "unauthorized".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}
