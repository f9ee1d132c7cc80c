// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form Gate Service
//!
//! The server-side gate behind a public contact form:
//!
//! - Strict schema validation of the lead payload
//! - Honeypot spam filtering with outwardly-silent success
//! - Per-client fixed-window rate limiting (5 per 15 minutes default)
//! - Hand-off of admitted leads to a transactional email API
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: Max submissions per client per window (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length in seconds (default: 900)
//! - `MAX_TRACKED_KEYS`: Tracked-client high-water mark (default: 2000)
//! - `RESEND_API_KEY`: Email API bearer token (delivery disabled without it)
//! - `RESEND_API_URL`: Email API endpoint (default: Resend)
//! - `CONTACT_FROM_EMAIL`: Sender address
//! - `CONTACT_TO_EMAIL`: Recipient address (delivery disabled without it)

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_form_gate::{
    config::{Config, NotifierConfig, RateLimitConfig},
    gate::SubmissionGate,
    handlers::{health, submit, AppState},
    limiter::RateLimiter,
    notifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        max_per_window = config.rate_limit.max_per_window,
        window_secs = config.rate_limit.window_secs,
        delivery_configured = config.notifier.delivery_configured(),
        "Starting contact form gate"
    );

    // Create application state
    let limiter = RateLimiter::new(config.rate_limit.clone());
    let notifier = notifier::from_config(&config.notifier);
    let gate = SubmissionGate::new(limiter, notifier);

    let state = Arc::new(AppState {
        gate,
        config: config.clone(),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/contact", post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    let notifier_defaults = NotifierConfig::default();

    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: RateLimitConfig {
            max_per_window: std::env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            window_secs: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            max_tracked_keys: std::env::var("MAX_TRACKED_KEYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
        },
        notifier: NotifierConfig {
            api_url: std::env::var("RESEND_API_URL").unwrap_or(notifier_defaults.api_url),
            api_key: std::env::var("RESEND_API_KEY").ok(),
            from: std::env::var("CONTACT_FROM_EMAIL").unwrap_or(notifier_defaults.from),
            to: std::env::var("CONTACT_TO_EMAIL").ok(),
            timeout_secs: notifier_defaults.timeout_secs,
        },
    }
}
