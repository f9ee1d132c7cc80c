// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound lead notification.
//!
//! Admitted leads are handed to a [`LeadNotifier`]. The production
//! implementation posts a plain-text summary to a transactional email API
//! with a bearer-token credential. Without credentials the gate falls back
//! to a log-only notifier that records no personal data.

use crate::config::NotifierConfig;
use crate::validator::SubmissionPayload;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Notification delivery error. Never surfaced to the submitting client.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("email API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

/// Outbound collaborator receiving validated, admitted leads.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(&self, lead: &SubmissionPayload) -> Result<(), NotifierError>;
}

/// Select a notifier from configuration: the email API when a credential and
/// recipient are both present, otherwise the log-only fallback.
pub fn from_config(config: &NotifierConfig) -> Arc<dyn LeadNotifier> {
    match (&config.api_key, &config.to) {
        (Some(api_key), Some(to)) => {
            match ResendNotifier::new(
                config.api_url.clone(),
                api_key.clone(),
                config.from.clone(),
                to.clone(),
                config.timeout_secs,
            ) {
                Ok(notifier) => Arc::new(notifier),
                Err(e) => {
                    warn!(error = %e, "Failed to build email client, using log notifier");
                    Arc::new(LogNotifier)
                }
            }
        }
        _ => {
            info!("Email delivery not configured, using log notifier");
            Arc::new(LogNotifier)
        }
    }
}

/// Email API client for lead delivery.
pub struct ResendNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    to: String,
}

impl ResendNotifier {
    pub fn new(
        api_url: String,
        api_key: String,
        from: String,
        to: String,
        timeout_secs: u64,
    ) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key,
            from,
            to,
        })
    }
}

#[async_trait]
impl LeadNotifier for ResendNotifier {
    async fn notify(&self, lead: &SubmissionPayload) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": self.from,
                "to": self.to,
                "subject": subject(lead),
                "text": text_body(lead),
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(company = %lead.company, "Lead forwarded to email API");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifierError::Api { status, body })
        }
    }
}

/// Fallback notifier used when email delivery is not configured.
pub struct LogNotifier;

#[async_trait]
impl LeadNotifier for LogNotifier {
    async fn notify(&self, lead: &SubmissionPayload) -> Result<(), NotifierError> {
        // Keeps personal data out of the logs: company, size and consent only.
        info!(
            company = %lead.company,
            message_chars = lead.message.chars().count(),
            consent = lead.consent,
            "Contact lead received (email delivery not configured)"
        );
        Ok(())
    }
}

fn subject(lead: &SubmissionPayload) -> String {
    format!("New website lead — {}", lead.company)
}

fn text_body(lead: &SubmissionPayload) -> String {
    format!(
        "Name: {}\nEmail: {}\nCompany: {}\nConsent: {}\n\nMessage:\n{}\n",
        lead.name, lead.email, lead.company, lead.consent, lead.message
    )
}
