// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for contact form submissions.
//!
//! Tracks submission counts per client identifier in fixed time windows.
//! State lives behind the [`RateLimitStore`] capability; the bundled
//! [`InMemoryStore`] keeps it in a process-local map, which makes the
//! limiter best-effort by design: counts are not shared across instances
//! and are rebuilt empty on restart.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Per-client window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Submissions observed in the current window
    pub count: u32,
    /// When the window expires
    pub window_reset_at: DateTime<Utc>,
}

impl RateLimitEntry {
    /// Whether this entry's window has expired at `now`.
    ///
    /// The boundary instant belongs to the old window: only strictly-later
    /// requests start a fresh one.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now > self.window_reset_at
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Seconds until the client may retry; 0 when admitted
    pub retry_after_secs: u64,
}

/// Storage capability for rate-limit state.
///
/// The limiter is agnostic to the backing store. Single-process deployments
/// use [`InMemoryStore`]; a networked key-value store with its own expiry can
/// implement this trait for multi-instance deployments and treat
/// `sweep_expired` as a no-op.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<RateLimitEntry>;
    async fn set(&self, key: &str, entry: RateLimitEntry);
    async fn len(&self) -> usize;
    /// Remove every entry whose window has expired at `now`.
    async fn sweep_expired(&self, now: DateTime<Utc>);
}

/// Process-local store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryStore {
    async fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.read().await.get(key).copied()
    }

    async fn set(&self, key: &str, entry: RateLimitEntry) {
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) {
        self.entries.write().await.retain(|_, e| !e.expired(now));
    }
}

/// Fixed-window rate limiter over a [`RateLimitStore`].
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
    /// Serializes the read-increment-write round-trip so concurrent requests
    /// from the same client cannot lose updates.
    admission: Mutex<()>,
}

impl RateLimiter {
    /// Create a limiter over a fresh in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    /// Create a limiter over an injected store.
    pub fn with_store(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            config,
            store,
            admission: Mutex::new(()),
        }
    }

    /// Check and record a submission from `client_id` at `now`.
    ///
    /// First request in a window (or after expiry) resets the entry to
    /// count 1 and is admitted. Within a live window the count keeps
    /// incrementing, denied requests included, and admission holds while
    /// `count <= max_per_window`.
    pub async fn check(&self, client_id: &str, now: DateTime<Utc>) -> Admission {
        let _guard = self.admission.lock().await;

        let admission = match self.store.get(client_id).await {
            Some(entry) if !entry.expired(now) => {
                let entry = RateLimitEntry {
                    count: entry.count.saturating_add(1),
                    window_reset_at: entry.window_reset_at,
                };
                self.store.set(client_id, entry).await;

                let allowed = entry.count <= self.config.max_per_window;
                if allowed {
                    Admission {
                        allowed: true,
                        retry_after_secs: 0,
                    }
                } else {
                    let retry_after_secs = retry_after_secs(entry.window_reset_at, now);
                    debug!(client = %client_id, retry_after_secs, "Rate limit exceeded");
                    Admission {
                        allowed: false,
                        retry_after_secs,
                    }
                }
            }
            _ => {
                let entry = RateLimitEntry {
                    count: 1,
                    window_reset_at: now + self.config.window_duration(),
                };
                self.store.set(client_id, entry).await;
                Admission {
                    allowed: true,
                    retry_after_secs: 0,
                }
            }
        };

        // Lazy, request-triggered cleanup; there is no background sweeper.
        if self.store.len().await > self.config.max_tracked_keys {
            debug!(max_tracked_keys = self.config.max_tracked_keys, "Sweeping expired entries");
            self.store.sweep_expired(now).await;
        }

        admission
    }
}

/// Seconds until the window resets, rounded up, never below 1.
fn retry_after_secs(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let ms = (reset_at - now).num_milliseconds().max(0);
    (((ms + 999) / 1000) as u64).max(1)
}
