use std::collections::VecDeque;

use async_trait::async_trait;
use taskdeck_application::RequestLogRepository;
use taskdeck_core::{AppError, AppResult};
use taskdeck_domain::{
    DEFAULT_REQUEST_LOG_CAPACITY, RequestCompletion, RequestLogEntry, RequestLogFilter,
    RequestLogId,
};
use tokio::sync::RwLock;

/// Ring buffer of the most recent request log entries.
#[derive(Debug)]
pub struct InMemoryRequestLogRepository {
    capacity: usize,
    entries: RwLock<VecDeque<RequestLogEntry>>,
}

impl InMemoryRequestLogRepository {
    /// Creates a buffer retaining at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> AppResult<Self> {
        if capacity == 0 {
            return Err(AppError::Validation(
                "request log capacity must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        })
    }
}

impl Default for InMemoryRequestLogRepository {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_REQUEST_LOG_CAPACITY,
            entries: RwLock::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl RequestLogRepository for InMemoryRequestLogRepository {
    async fn append(&self, entry: RequestLogEntry) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }

        Ok(())
    }

    async fn complete(&self, id: RequestLogId, completion: RequestCompletion) -> AppResult<bool> {
        let mut entries = self.entries.write().await;

        // In-flight entries sit near the back.
        match entries.iter_mut().rev().find(|entry| entry.id == id) {
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
            .read()
            .await
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.entries.read().await.len())
    }
}
