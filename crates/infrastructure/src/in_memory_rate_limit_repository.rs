use std::collections::HashMap;

use async_trait::async_trait;
use taskdeck_application::{EndpointRateLimit, RateLimitRepository, TrackedRateLimit};
use taskdeck_core::AppResult;
use taskdeck_domain::{
    RateLimitConfig, RateLimitDecision, RateLimitEntry, RateLimitKey, evaluate_window,
};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory rate limit store. State is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    configs: RwLock<HashMap<String, RateLimitConfig>>,
    entries: RwLock<HashMap<RateLimitKey, StoredWindow>>,
}

/// Window state plus the endpoint it was opened for. Keys embed
/// client-supplied addresses, so the endpoint is never parsed back out.
#[derive(Debug)]
struct StoredWindow {
    endpoint: String,
    entry: RateLimitEntry,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn save_config(&self, endpoint: &str, config: RateLimitConfig) -> AppResult<()> {
        self.configs
            .write()
            .await
            .insert(endpoint.to_owned(), config);
        Ok(())
    }

    async fn find_config(&self, endpoint: &str) -> AppResult<Option<RateLimitConfig>> {
        Ok(self.configs.read().await.get(endpoint).copied())
    }

    async fn list_configs(&self) -> AppResult<Vec<EndpointRateLimit>> {
        Ok(self
            .configs
            .read()
            .await
            .iter()
            .map(|(endpoint, config)| EndpointRateLimit {
                endpoint: endpoint.clone(),
                config: *config,
            })
            .collect())
    }

    async fn apply_request(
        &self,
        key: &RateLimitKey,
        endpoint: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> AppResult<RateLimitDecision> {
        let mut entries = self.entries.write().await;
        let tracked = entries.len();
        entries.retain(|_, stored| !stored.entry.is_stale_at(now_ms));
        let purged = tracked - entries.len();
        if purged > 0 {
            debug!(purged, "purged stale rate limit entries");
        }

        let current = entries.get(key).map(|stored| &stored.entry);
        let evaluation = evaluate_window(current, config, now_ms);
        entries.insert(
            key.clone(),
            StoredWindow {
                endpoint: endpoint.to_owned(),
                entry: evaluation.entry,
            },
        );

        Ok(evaluation.decision)
    }

    async fn list_entries(&self) -> AppResult<Vec<TrackedRateLimit>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .map(|(key, stored)| TrackedRateLimit {
                key: key.clone(),
                endpoint: stored.endpoint.clone(),
                entry: stored.entry,
            })
            .collect())
    }

    async fn remove_entries_for_endpoint(&self, endpoint: &str) -> AppResult<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| stored.endpoint != endpoint);
        Ok(before - entries.len())
    }
}
