// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact form gate.
//!
//! The response never leaks more than the outcome class: `200 {ok: true}`
//! for accepted and silently-dropped submissions alike, `400` with a generic
//! message for anything invalid, `429` with `Retry-After` when rate limited.

use crate::config::Config;
use crate::gate::{SubmissionGate, SubmissionOutcome};
use crate::validator::RawSubmission;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Shared application state.
pub struct AppState {
    pub gate: SubmissionGate,
    pub config: Config,
}

/// Body of every `/contact` response.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn error(message: &'static str) -> Self {
        Self {
            ok: false,
            error: Some(message),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-form-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Contact form submission endpoint.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<RawSubmission>, JsonRejection>,
) -> Response {
    let client_id = client_ip(&headers);

    let Json(raw) = match body {
        Ok(json) => json,
        Err(rejection) => {
            // Unparseable bodies get the same outward shape as schema failures.
            debug!(client = %client_id, error = %rejection, "Malformed request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Invalid payload")),
            )
                .into_response();
        }
    };

    match state.gate.submit(raw, &client_id, Utc::now()).await {
        SubmissionOutcome::Accepted | SubmissionOutcome::SilentlyDropped => {
            (StatusCode::OK, Json(ApiResponse::ok())).into_response()
        }
        SubmissionOutcome::RejectedInvalid(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Invalid payload")),
        )
            .into_response(),
        SubmissionOutcome::RejectedRateLimited { retry_after_secs } => (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", retry_after_secs.to_string())],
            Json(ApiResponse::error("Too many requests")),
        )
            .into_response(),
    }
}

/// Derive the client identifier from forwarding headers: first non-empty
/// segment of `x-forwarded-for`, else `x-real-ip`, else `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded
            .split(',')
            .map(str::trim)
            .find(|s| !s.is_empty())
        {
            return first.to_string();
        }
    }

    if let Some(real) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real = real.trim();
        if !real.is_empty() {
            return real.to_string();
        }
    }

    "unknown".to_string()
}
