// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form Gate
//!
//! This crate provides the server-side gate behind a public contact form:
//!
//! - Strict schema validation of the lead payload
//! - Honeypot spam filtering with outwardly-silent success
//! - Per-client fixed-window rate limiting (in-memory, best-effort)
//! - Hand-off of admitted leads to an outbound email notifier

pub mod config;
pub mod gate;
pub mod handlers;
pub mod limiter;
pub mod notifier;
pub mod validator;

pub use config::Config;
pub use gate::{SubmissionGate, SubmissionOutcome};
pub use limiter::{Admission, RateLimitStore, RateLimiter};
pub use validator::{SubmissionPayload, SubmissionValidator, ValidationError};
