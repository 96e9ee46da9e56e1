//! Fixed-window limiter keyed by caller identity and endpoint.

use std::sync::Arc;

use taskdeck_core::{AppError, AppResult};
use taskdeck_domain::{RateLimitConfig, RateLimitDecision, RateLimitKey};
use tracing::{info, warn};

use crate::traffic_ports::{Clock, EndpointRateLimit, RateLimitRepository};

#[cfg(test)]
mod tests;

/// Window of one key that is still active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Tracked key.
    pub key: RateLimitKey,
    /// Endpoint the window was opened for.
    pub endpoint: String,
    /// Requests admitted in the window.
    pub count: u32,
    /// Requests left in the window.
    pub remaining: u32,
    /// Unix milliseconds at which the window resets.
    pub reset_at_ms: i64,
}

/// Application service for per-endpoint rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
    clock: Arc<dyn Clock>,
    default_config: RateLimitConfig,
}

impl RateLimitService {
    /// Creates a limiter that falls back to 100 requests per minute.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            default_config: RateLimitConfig::default(),
        }
    }

    /// Replaces the fallback policy for unconfigured endpoints.
    #[must_use]
    pub fn with_default_config(mut self, default_config: RateLimitConfig) -> Self {
        self.default_config = default_config;
        self
    }

    /// Replaces the policy of an endpoint.
    ///
    /// A zero window or budget fails with [`AppError::InvalidConfig`] and
    /// leaves the previous policy in place.
    pub async fn set_config(
        &self,
        endpoint: &str,
        window_ms: u64,
        max_requests: u32,
    ) -> AppResult<RateLimitConfig> {
        if endpoint.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "endpoint must not be empty".to_owned(),
            ));
        }

        let config = RateLimitConfig::new(window_ms, max_requests)?;
        self.repository.save_config(endpoint, config).await?;

        info!(
            endpoint,
            window_ms = config.window_ms(),
            max_requests = config.max_requests(),
            "rate limit config updated"
        );

        Ok(config)
    }

    /// Returns the policy in effect for an endpoint.
    pub async fn get_config(&self, endpoint: &str) -> AppResult<RateLimitConfig> {
        Ok(self
            .repository
            .find_config(endpoint)
            .await?
            .unwrap_or(self.default_config))
    }

    /// Lists explicit policies ordered by endpoint.
    pub async fn list_configs(&self) -> AppResult<Vec<EndpointRateLimit>> {
        let mut configs = self.repository.list_configs().await?;
        configs.sort_by(|left, right| left.endpoint.cmp(&right.endpoint));
        Ok(configs)
    }

    /// Counts one request against `key` under the policy of `endpoint`.
    ///
    /// Denials are reported through the decision, never as an error.
    pub async fn check_rate_limit(
        &self,
        key: &RateLimitKey,
        endpoint: &str,
    ) -> AppResult<RateLimitDecision> {
        let config = self.get_config(endpoint).await?;
        let decision = self
            .repository
            .apply_request(key, endpoint, &config, self.clock.now_ms())
            .await?;

        if !decision.allowed {
            warn!(key = %key, endpoint, limit = decision.limit, "rate limit exceeded");
        }

        Ok(decision)
    }

    /// Lists windows that are still active, busiest first.
    pub async fn current_status(&self) -> AppResult<Vec<RateLimitStatus>> {
        let now_ms = self.clock.now_ms();
        let tracked = self.repository.list_entries().await?;

        let mut statuses = Vec::with_capacity(tracked.len());
        for item in tracked {
            if item.entry.is_expired_at(now_ms) {
                continue;
            }

            let limit = self.get_config(&item.endpoint).await?.max_requests();

            statuses.push(RateLimitStatus {
                key: item.key,
                endpoint: item.endpoint,
                count: item.entry.count,
                remaining: limit.saturating_sub(item.entry.count),
                reset_at_ms: item.entry.window_reset_at_ms,
            });
        }

        statuses.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.key.cmp(&right.key))
        });

        Ok(statuses)
    }

    /// Returns how many keys currently hold window state, expired ones
    /// included.
    pub async fn tracked_keys(&self) -> AppResult<usize> {
        Ok(self.repository.list_entries().await?.len())
    }

    /// Installs the policies the dashboard ships with.
    pub async fn apply_default_configs(&self) -> AppResult<()> {
        let defaults = [
            ("/api/tasks", RateLimitConfig::default()),
            ("/api/auth/login", RateLimitConfig::AUTH_LOGIN),
            ("/api/auth/register", RateLimitConfig::AUTH_REGISTER),
        ];

        for (endpoint, config) in defaults {
            self.set_config(endpoint, config.window_ms(), config.max_requests())
                .await?;
        }

        Ok(())
    }

    /// Drops every window tracked for `endpoint` so its callers start fresh.
    pub async fn reset_limits(&self, endpoint: &str) -> AppResult<usize> {
        let removed = self.repository.remove_entries_for_endpoint(endpoint).await?;
        info!(endpoint, removed, "rate limit windows reset");
        Ok(removed)
    }
}
