//! Fixed-window rate limit policy and per-key window evaluation.
//!
//! A key's window opens on its first request and hard-resets on the first
//! request after it elapses. A client can therefore spend a full budget just
//! before the reset instant and another one just after it.

use serde::{Deserialize, Serialize};
use taskdeck_core::{AppError, AppResult};

/// Window applied to endpoints without explicit configuration.
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

/// Request budget applied to endpoints without explicit configuration.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;

/// How long an expired entry is kept before opportunistic purging.
pub const STALE_ENTRY_GRACE_MS: i64 = 60_000;

/// Per-endpoint rate limit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitConfig {
    window_ms: u64,
    max_requests: u32,
}

impl RateLimitConfig {
    /// 10 requests per minute.
    pub const STRICT: Self = Self {
        window_ms: 60_000,
        max_requests: 10,
    };
    /// 60 requests per minute.
    pub const MODERATE: Self = Self {
        window_ms: 60_000,
        max_requests: 60,
    };
    /// 200 requests per minute.
    pub const LENIENT: Self = Self {
        window_ms: 60_000,
        max_requests: 200,
    };
    /// 5 requests per 15 minutes.
    pub const AUTH_LOGIN: Self = Self {
        window_ms: 900_000,
        max_requests: 5,
    };
    /// 3 requests per hour.
    pub const AUTH_REGISTER: Self = Self {
        window_ms: 3_600_000,
        max_requests: 3,
    };
    /// 1000 requests per minute.
    pub const PUBLIC_API: Self = Self {
        window_ms: 60_000,
        max_requests: 1_000,
    };

    /// Creates a validated policy.
    ///
    /// Both the window and the budget must be positive; anything else is
    /// rejected with [`AppError::InvalidConfig`].
    pub fn new(window_ms: u64, max_requests: u32) -> AppResult<Self> {
        if window_ms == 0 {
            return Err(AppError::InvalidConfig(
                "window_ms must be greater than zero".to_owned(),
            ));
        }

        if max_requests == 0 {
            return Err(AppError::InvalidConfig(
                "max_requests must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            window_ms,
            max_requests,
        })
    }

    /// Creates a validated policy from untrusted signed transport values.
    pub fn from_signed(window_ms: i64, max_requests: i64) -> AppResult<Self> {
        let window_ms = u64::try_from(window_ms).map_err(|_| {
            AppError::InvalidConfig(format!("window_ms must be positive, got {window_ms}"))
        })?;
        let max_requests = u32::try_from(max_requests).map_err(|_| {
            AppError::InvalidConfig(format!(
                "max_requests must be between 1 and {}, got {max_requests}",
                u32::MAX
            ))
        })?;

        Self::new(window_ms, max_requests)
    }

    /// Returns the window length in milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Returns the request budget per window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Human readable denial reason for this policy.
    #[must_use]
    pub fn exceeded_reason(&self) -> String {
        format!(
            "Rate limit exceeded. Max {} requests per {}s",
            self.max_requests,
            format_window_seconds(self.window_ms)
        )
    }

    fn window_ms_signed(&self) -> i64 {
        i64::try_from(self.window_ms).unwrap_or(i64::MAX)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

fn format_window_seconds(window_ms: u64) -> String {
    if window_ms % 1_000 == 0 {
        (window_ms / 1_000).to_string()
    } else {
        (window_ms as f64 / 1_000.0).to_string()
    }
}

/// Counter state tracked for one rate limit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    /// Requests admitted in the current window.
    pub count: u32,
    /// Unix milliseconds after which the window is over.
    pub window_reset_at_ms: i64,
    /// Unix milliseconds of the request that opened the window.
    pub first_request_at_ms: i64,
}

impl RateLimitEntry {
    /// Opens a fresh window holding a single request.
    #[must_use]
    pub fn open(config: &RateLimitConfig, now_ms: i64) -> Self {
        Self {
            count: 1,
            window_reset_at_ms: now_ms.saturating_add(config.window_ms_signed()),
            first_request_at_ms: now_ms,
        }
    }

    /// Returns whether the window is over at `now_ms`.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.window_reset_at_ms
    }

    /// Returns whether the entry may be dropped at `now_ms`.
    #[must_use]
    pub fn is_stale_at(&self, now_ms: i64) -> bool {
        now_ms > self.window_reset_at_ms.saturating_add(STALE_ENTRY_GRACE_MS)
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Budget of the policy that produced the decision.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Unix milliseconds at which the window resets.
    pub reset_at_ms: i64,
    /// Denial reason, only present when `allowed` is false.
    pub reason: Option<String>,
}

impl RateLimitDecision {
    /// Whole seconds a denied client should wait, rounded up.
    ///
    /// A denial always asks for at least one second, since the reset instant
    /// itself still belongs to the exhausted window.
    #[must_use]
    pub fn retry_after_seconds(&self, now_ms: i64) -> u64 {
        let wait_ms = self.reset_at_ms.saturating_sub(now_ms).max(0);
        let seconds = u64::try_from(wait_ms).unwrap_or_default().div_ceil(1_000);
        if self.allowed { seconds } else { seconds.max(1) }
    }

    /// Reset instant as unix seconds, rounded up.
    #[must_use]
    pub fn reset_at_unix_seconds(&self) -> i64 {
        let seconds = self.reset_at_ms.div_euclid(1_000);
        if self.reset_at_ms.rem_euclid(1_000) == 0 {
            seconds
        } else {
            seconds.saturating_add(1)
        }
    }
}

/// Result of applying one request to a key's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEvaluation {
    /// Decision to hand back to the caller.
    pub decision: RateLimitDecision,
    /// Entry to store for the key after this request.
    pub entry: RateLimitEntry,
}

/// Applies one request to the current window state of a key.
///
/// A missing or expired entry opens a new window. A denied request leaves the
/// stored entry untouched, so `count` never exceeds the budget.
#[must_use]
pub fn evaluate_window(
    existing: Option<&RateLimitEntry>,
    config: &RateLimitConfig,
    now_ms: i64,
) -> WindowEvaluation {
    let limit = config.max_requests();

    let Some(current) = existing.filter(|entry| !entry.is_expired_at(now_ms)) else {
        let entry = RateLimitEntry::open(config, now_ms);
        return WindowEvaluation {
            decision: RateLimitDecision {
                allowed: true,
                limit,
                remaining: limit.saturating_sub(1),
                reset_at_ms: entry.window_reset_at_ms,
                reason: None,
            },
            entry,
        };
    };

    if current.count >= limit {
        return WindowEvaluation {
            decision: RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at_ms: current.window_reset_at_ms,
                reason: Some(config.exceeded_reason()),
            },
            entry: *current,
        };
    }

    let entry = RateLimitEntry {
        count: current.count.saturating_add(1),
        ..*current
    };

    WindowEvaluation {
        decision: RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit.saturating_sub(entry.count),
            reset_at_ms: entry.window_reset_at_ms,
            reason: None,
        },
        entry,
    }
}
