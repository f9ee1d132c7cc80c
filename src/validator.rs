// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: Apache-2.0

//! Lead payload validator.
//!
//! Validates an untyped inbound submission against the contact form schema:
//! - Required fields present and non-empty
//! - Length bounds per field
//! - Syntactically valid email address
//! - Explicit consent
//!
//! Validation is pure: no I/O, no shared state. A payload either satisfies
//! every constraint or is rejected wholesale with the full list of
//! violations.

use email_address::EmailAddress;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Maximum length of the sender name, in characters.
pub const NAME_MAX_CHARS: usize = 120;
/// Maximum length of the email address, in characters.
pub const EMAIL_MAX_CHARS: usize = 200;
/// Maximum length of the company name, in characters.
pub const COMPANY_MAX_CHARS: usize = 200;
/// Maximum length of the message body, in characters.
pub const MESSAGE_MAX_CHARS: usize = 4000;

/// Untyped inbound submission, as deserialized from the request body.
///
/// Every field is optional so that missing and mistyped input surfaces as a
/// validation failure rather than a deserialization one. The `website` field
/// is the honeypot: hidden in the rendered form, left empty by real users.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub consent: Option<bool>,
    #[serde(default)]
    pub website: Option<String>,
}

/// A fully-validated lead submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub consent: bool,
    /// Honeypot field, carried through for the spam gate.
    pub website: Option<String>,
}

impl SubmissionPayload {
    /// A non-empty honeypot marks the submission as spam.
    pub fn is_spam(&self) -> bool {
        self.website
            .as_deref()
            .map_or(false, |w| !w.trim().is_empty())
    }
}

/// A single violated constraint.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldViolation {
    #[error("missing field: {0}")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("consent must be granted")]
    ConsentRequired,
}

/// Validation failure carrying every violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid submission: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Contact form submission validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionValidator;

impl SubmissionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw submission into a typed payload.
    ///
    /// Collects every violation rather than stopping at the first, so the
    /// server log can name all offending fields for a rejected request.
    pub fn validate(&self, raw: RawSubmission) -> Result<SubmissionPayload, ValidationError> {
        let mut violations = Vec::new();

        check_text(&raw.name, "name", NAME_MAX_CHARS, &mut violations);
        check_email(&raw.email, &mut violations);
        check_text(&raw.company, "company", COMPANY_MAX_CHARS, &mut violations);
        check_text(&raw.message, "message", MESSAGE_MAX_CHARS, &mut violations);

        match raw.consent {
            None => violations.push(FieldViolation::Missing("consent")),
            Some(false) => violations.push(FieldViolation::ConsentRequired),
            Some(true) => {}
        }

        if !violations.is_empty() {
            debug!(violations = violations.len(), "Submission failed validation");
            return Err(ValidationError { violations });
        }

        // All four fields were verified present above.
        Ok(SubmissionPayload {
            name: raw.name.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            company: raw.company.unwrap_or_default(),
            message: raw.message.unwrap_or_default(),
            consent: true,
            website: raw.website,
        })
    }
}

/// Check a required free-text field: present, non-empty, within bounds.
fn check_text(
    value: &Option<String>,
    field: &'static str,
    max: usize,
    violations: &mut Vec<FieldViolation>,
) {
    match value {
        None => violations.push(FieldViolation::Missing(field)),
        Some(s) if s.is_empty() => violations.push(FieldViolation::Empty(field)),
        Some(s) if s.chars().count() > max => {
            violations.push(FieldViolation::TooLong { field, max })
        }
        Some(_) => {}
    }
}

fn check_email(value: &Option<String>, violations: &mut Vec<FieldViolation>) {
    let email = match value {
        None => {
            violations.push(FieldViolation::Missing("email"));
            return;
        }
        Some(e) => e,
    };

    if email.chars().count() > EMAIL_MAX_CHARS {
        violations.push(FieldViolation::TooLong {
            field: "email",
            max: EMAIL_MAX_CHARS,
        });
    }

    if email.parse::<EmailAddress>().is_err() {
        violations.push(FieldViolation::InvalidEmail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> RawSubmission {
        RawSubmission {
            name: Some("Leen".to_string()),
            email: Some("leen@example.com".to_string()),
            company: Some("Acme".to_string()),
            message: Some("Hello there".to_string()),
            consent: Some(true),
            website: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let validator = SubmissionValidator::new();
        let payload = validator.validate(valid_raw()).unwrap();

        assert_eq!(payload.name, "Leen");
        assert_eq!(payload.company, "Acme");
        assert!(payload.consent);
        assert!(!payload.is_spam());
    }

    #[test]
    fn test_empty_name_rejected() {
        let validator = SubmissionValidator::new();
        let raw = RawSubmission {
            name: Some(String::new()),
            ..valid_raw()
        };

        let err = validator.validate(raw).unwrap_err();
        assert_eq!(err.violations, vec![FieldViolation::Empty("name")]);
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let validator = SubmissionValidator::new();
        let err = validator.validate(RawSubmission::default()).unwrap_err();

        assert_eq!(err.violations.len(), 5);
        assert!(err.violations.contains(&FieldViolation::Missing("name")));
        assert!(err.violations.contains(&FieldViolation::Missing("email")));
        assert!(err.violations.contains(&FieldViolation::Missing("consent")));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let validator = SubmissionValidator::new();

        for bad in ["not-an-email", "a@", "@b.com", ""] {
            let raw = RawSubmission {
                email: Some(bad.to_string()),
                ..valid_raw()
            };
            let err = validator.validate(raw).unwrap_err();
            assert!(
                err.violations.contains(&FieldViolation::InvalidEmail),
                "email {bad:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_length_bounds() {
        let validator = SubmissionValidator::new();

        let raw = RawSubmission {
            name: Some("x".repeat(NAME_MAX_CHARS + 1)),
            message: Some("y".repeat(MESSAGE_MAX_CHARS + 1)),
            ..valid_raw()
        };
        let err = validator.validate(raw).unwrap_err();

        assert!(err.violations.contains(&FieldViolation::TooLong {
            field: "name",
            max: NAME_MAX_CHARS
        }));
        assert!(err.violations.contains(&FieldViolation::TooLong {
            field: "message",
            max: MESSAGE_MAX_CHARS
        }));

        // Exactly at the bound is fine
        let raw = RawSubmission {
            name: Some("x".repeat(NAME_MAX_CHARS)),
            ..valid_raw()
        };
        assert!(validator.validate(raw).is_ok());
    }

    #[test]
    fn test_consent_must_be_true() {
        let validator = SubmissionValidator::new();
        let raw = RawSubmission {
            consent: Some(false),
            ..valid_raw()
        };

        let err = validator.validate(raw).unwrap_err();
        assert_eq!(err.violations, vec![FieldViolation::ConsentRequired]);
    }

    #[test]
    fn test_honeypot_carried_through() {
        let validator = SubmissionValidator::new();
        let raw = RawSubmission {
            website: Some("http://spam".to_string()),
            ..valid_raw()
        };

        let payload = validator.validate(raw).unwrap();
        assert!(payload.is_spam());

        // Whitespace-only honeypot does not trip
        let raw = RawSubmission {
            website: Some("   ".to_string()),
            ..valid_raw()
        };
        assert!(!validator.validate(raw).unwrap().is_spam());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = SubmissionValidator::new();
        let raw = valid_raw();

        let first = validator.validate(raw.clone()).unwrap();
        let second = validator.validate(raw).unwrap();
        assert_eq!(first, second);
    }
}
