use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use taskdeck_core::AppResult;
use taskdeck_domain::{
    EndpointRoute, EndpointStatusEntry, RateLimitConfig, RateLimitDecision, RateLimitEntry,
    RateLimitKey, RequestCompletion, RequestLogEntry, RequestLogFilter, RequestLogId,
    SystemLogEntry, SystemLogQuery, evaluate_window,
};

use crate::traffic_ports::{
    Clock, EndpointRateLimit, EndpointStatusRecord, EndpointStatusRepository, RateLimitRepository,
    RequestLogRepository, SystemLogRepository, TrackedRateLimit,
};

pub(crate) struct FakeClock {
    now_ms: AtomicI64,
}

impl FakeClock {
    pub(crate) fn at(now_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            now_ms: AtomicI64::new(now_ms),
        })
    }

    pub(crate) fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct FakeRateLimitRepository {
    configs: Mutex<HashMap<String, RateLimitConfig>>,
    entries: Mutex<HashMap<RateLimitKey, (String, RateLimitEntry)>>,
}

impl FakeRateLimitRepository {
    pub(crate) async fn entry(&self, key: &RateLimitKey) -> Option<RateLimitEntry> {
        self.entries.lock().await.get(key).map(|(_, entry)| *entry)
    }
}

#[async_trait]
impl RateLimitRepository for FakeRateLimitRepository {
    async fn save_config(&self, endpoint: &str, config: RateLimitConfig) -> AppResult<()> {
        self.configs.lock().await.insert(endpoint.to_owned(), config);
        Ok(())
    }

    async fn find_config(&self, endpoint: &str) -> AppResult<Option<RateLimitConfig>> {
        Ok(self.configs.lock().await.get(endpoint).copied())
    }

    async fn list_configs(&self) -> AppResult<Vec<EndpointRateLimit>> {
        Ok(self
            .configs
            .lock()
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
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, entry)| !entry.is_stale_at(now_ms));
        let current = entries.get(key).map(|(_, entry)| entry);
        let evaluation = evaluate_window(current, config, now_ms);
        entries.insert(key.clone(), (endpoint.to_owned(), evaluation.entry));
        Ok(evaluation.decision)
    }

    async fn list_entries(&self) -> AppResult<Vec<TrackedRateLimit>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .map(|(key, (endpoint, entry))| TrackedRateLimit {
                key: key.clone(),
                endpoint: endpoint.clone(),
                entry: *entry,
            })
            .collect())
    }

    async fn remove_entries_for_endpoint(&self, endpoint: &str) -> AppResult<usize> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, (stored, _)| stored != endpoint);
        Ok(before - entries.len())
    }
}

#[derive(Default)]
pub(crate) struct FakeRequestLogRepository {
    entries: Mutex<Vec<RequestLogEntry>>,
}

impl FakeRequestLogRepository {
    pub(crate) async fn seed(&self, entries: Vec<RequestLogEntry>) {
        self.entries.lock().await.extend(entries);
    }
}

#[async_trait]
impl RequestLogRepository for FakeRequestLogRepository {
    async fn append(&self, entry: RequestLogEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn complete(&self, id: RequestLogId, completion: RequestCompletion) -> AppResult<bool> {
        let mut entries = self.entries.lock().await;
        match entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.complete(completion);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_matching(&self, filter: &RequestLogFilter) -> AppResult<Vec<RequestLogEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.entries.lock().await.len())
    }
}

#[derive(Default)]
pub(crate) struct FakeEndpointStatusRepository {
    entries: Mutex<HashMap<EndpointRoute, EndpointStatusEntry>>,
}

#[async_trait]
impl EndpointStatusRepository for FakeEndpointStatusRepository {
    async fn find(&self, route: &EndpointRoute) -> AppResult<Option<EndpointStatusEntry>> {
        Ok(self.entries.lock().await.get(route).copied())
    }

    async fn save(&self, route: EndpointRoute, entry: EndpointStatusEntry) -> AppResult<()> {
        self.entries.lock().await.insert(route, entry);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<EndpointStatusRecord>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .map(|(route, entry)| EndpointStatusRecord {
                route: route.clone(),
                entry: *entry,
            })
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeSystemLogRepository {
    entries: Mutex<Vec<SystemLogEntry>>,
}

#[async_trait]
impl SystemLogRepository for FakeSystemLogRepository {
    async fn append(&self, entry: SystemLogEntry) -> AppResult<()> {
        self.entries.lock().await.insert(0, entry);
        Ok(())
    }

    async fn list(&self, query: &SystemLogQuery) -> AppResult<Vec<SystemLogEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|entry| query.matches(entry))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> AppResult<usize> {
        let mut entries = self.entries.lock().await;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }
}
