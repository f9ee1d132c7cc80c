// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact form gate.
//!
//! Rate-limit defaults match the limits the public site has always enforced:
//! 5 submissions per client per 15-minute window.

use serde::{Deserialize, Serialize};

/// Configuration for the contact form gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Outbound notification configuration
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted submissions per client per window (default: 5)
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Window length in seconds (default: 900, i.e. 15 minutes)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// High-water mark of tracked client keys before expired entries are
    /// swept (default: 2000)
    #[serde(default = "default_max_tracked_keys")]
    pub max_tracked_keys: usize,
}

/// Outbound lead notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Transactional email API endpoint (default: Resend)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the email API. Delivery is disabled without it.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address
    #[serde(default = "default_from")]
    pub from: String,

    /// Recipient address. Delivery is disabled without it.
    #[serde(default)]
    pub to: Option<String>,

    /// Outbound request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_per_window() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    900 // 15 minutes
}

fn default_max_tracked_keys() -> usize {
    2000
}

fn default_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_from() -> String {
    "LeenAI Website <no-reply@example.com>".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
            max_tracked_keys: default_max_tracked_keys(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            from: default_from(),
            to: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Get the window duration
    pub fn window_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }
}

impl NotifierConfig {
    /// Delivery requires both a credential and a recipient.
    pub fn delivery_configured(&self) -> bool {
        self.api_key.is_some() && self.to.is_some()
    }
}
