// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission gate orchestration.
//!
//! Sequencing is strict and short-circuiting: validate, honeypot, rate
//! limit, notify. Invalid and spam submissions never charge the limiter and
//! never reach the notifier.

use crate::limiter::RateLimiter;
use crate::notifier::LeadNotifier;
use crate::validator::{RawSubmission, SubmissionValidator, ValidationError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terminal outcome of a submission. The caller never observes anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Admitted and handed to the notifier
    Accepted,
    /// Failed schema validation
    RejectedInvalid(ValidationError),
    /// Over the per-client window cap
    RejectedRateLimited { retry_after_secs: u64 },
    /// Honeypot tripped; outwardly identical to `Accepted`
    SilentlyDropped,
}

/// The submission gate: validator, rate limiter and notifier composed in
/// their fixed order.
pub struct SubmissionGate {
    validator: SubmissionValidator,
    limiter: RateLimiter,
    notifier: Arc<dyn LeadNotifier>,
}

impl SubmissionGate {
    pub fn new(limiter: RateLimiter, notifier: Arc<dyn LeadNotifier>) -> Self {
        Self {
            validator: SubmissionValidator::new(),
            limiter,
            notifier,
        }
    }

    /// Process one submission from `client_id` observed at `now`.
    pub async fn submit(
        &self,
        raw: RawSubmission,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> SubmissionOutcome {
        let payload = match self.validator.validate(raw) {
            Ok(payload) => payload,
            Err(e) => {
                info!(client = %client_id, error = %e, "Submission rejected as invalid");
                return SubmissionOutcome::RejectedInvalid(e);
            }
        };

        if payload.is_spam() {
            // Succeeds outwardly so the detection mechanism stays hidden.
            debug!(client = %client_id, "Honeypot tripped, dropping silently");
            return SubmissionOutcome::SilentlyDropped;
        }

        let admission = self.limiter.check(client_id, now).await;
        if !admission.allowed {
            info!(
                client = %client_id,
                retry_after_secs = admission.retry_after_secs,
                "Submission rate limited"
            );
            return SubmissionOutcome::RejectedRateLimited {
                retry_after_secs: admission.retry_after_secs,
            };
        }

        // Delivery failures stay server-side; the caller still sees success.
        if let Err(e) = self.notifier.notify(&payload).await {
            warn!(client = %client_id, error = %e, "Lead notification failed");
        }

        SubmissionOutcome::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::notifier::NotifierError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingNotifier {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl LeadNotifier for RecordingNotifier {
        async fn notify(&self, _lead: &crate::SubmissionPayload) -> Result<(), NotifierError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl LeadNotifier for FailingNotifier {
        async fn notify(&self, _lead: &crate::SubmissionPayload) -> Result<(), NotifierError> {
            Err(NotifierError::Api {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream unavailable".to_string(),
            })
        }
    }

    fn gate_with(
        max_per_window: u32,
        notifier: Arc<dyn LeadNotifier>,
    ) -> SubmissionGate {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_per_window,
            window_secs: 900,
            ..Default::default()
        });
        SubmissionGate::new(limiter, notifier)
    }

    fn valid_raw() -> RawSubmission {
        RawSubmission {
            name: Some("Leen".to_string()),
            email: Some("leen@example.com".to_string()),
            company: Some("Acme".to_string()),
            message: Some("hi".to_string()),
            consent: Some(true),
            website: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_accepted_invokes_notifier() {
        let notifier = Arc::new(RecordingNotifier::default());
        let gate = gate_with(5, notifier.clone());

        let outcome = gate.submit(valid_raw(), "1.2.3.4", now()).await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_not_charged_and_not_notified() {
        let notifier = Arc::new(RecordingNotifier::default());
        let gate = gate_with(1, notifier.clone());

        let invalid = RawSubmission {
            name: Some(String::new()),
            ..valid_raw()
        };
        for _ in 0..3 {
            let outcome = gate.submit(invalid.clone(), "1.2.3.4", now()).await;
            assert!(matches!(outcome, SubmissionOutcome::RejectedInvalid(_)));
        }
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);

        // The window cap of 1 is untouched, so a valid submission passes
        let outcome = gate.submit(valid_raw(), "1.2.3.4", now()).await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_honeypot_drops_silently() {
        let notifier = Arc::new(RecordingNotifier::default());
        let gate = gate_with(1, notifier.clone());

        let spam = RawSubmission {
            website: Some("http://spam".to_string()),
            ..valid_raw()
        };
        for _ in 0..3 {
            let outcome = gate.submit(spam.clone(), "1.2.3.4", now()).await;
            assert_eq!(outcome, SubmissionOutcome::SilentlyDropped);
        }
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);

        // Spam never charged the limiter
        let outcome = gate.submit(valid_raw(), "1.2.3.4", now()).await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_rate_limited_outcome() {
        let notifier = Arc::new(RecordingNotifier::default());
        let gate = gate_with(1, notifier.clone());

        assert_eq!(
            gate.submit(valid_raw(), "1.2.3.4", now()).await,
            SubmissionOutcome::Accepted
        );
        match gate.submit(valid_raw(), "1.2.3.4", now()).await {
            SubmissionOutcome::RejectedRateLimited { retry_after_secs } => {
                assert!(retry_after_secs >= 1);
            }
            other => panic!("expected rate limited, got {other:?}"),
        }
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notifier_failure_still_accepted() {
        let gate = gate_with(5, Arc::new(FailingNotifier));

        let outcome = gate.submit(valid_raw(), "1.2.3.4", now()).await;
        assert_eq!(outcome, SubmissionOutcome::Accepted);
    }
}
