use std::collections::VecDeque;

use async_trait::async_trait;
use taskdeck_application::SystemLogRepository;
use taskdeck_core::{AppError, AppResult};
use taskdeck_domain::{DEFAULT_SYSTEM_LOG_CAPACITY, SystemLogEntry, SystemLogQuery};
use tokio::sync::RwLock;

/// Newest-first buffer of system log entries.
#[derive(Debug)]
pub struct InMemorySystemLogRepository {
    capacity: usize,
    entries: RwLock<VecDeque<SystemLogEntry>>,
}

impl InMemorySystemLogRepository {
    /// Creates a buffer retaining at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> AppResult<Self> {
        if capacity == 0 {
            return Err(AppError::Validation(
                "system log capacity must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        })
    }
}

impl Default for InMemorySystemLogRepository {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SYSTEM_LOG_CAPACITY,
            entries: RwLock::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl SystemLogRepository for InMemorySystemLogRepository {
    async fn append(&self, entry: SystemLogEntry) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(self.capacity);
        Ok(())
    }

    async fn list(&self, query: &SystemLogQuery) -> AppResult<Vec<SystemLogEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|entry| query.matches(entry))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> AppResult<usize> {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }
}
