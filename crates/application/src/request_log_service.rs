use std::sync::Arc;

use taskdeck_core::AppResult;
use taskdeck_domain::{
    NewRequestLogEntry, RequestCompletion, RequestLogEntry, RequestLogFilter, RequestLogId,
};
use tracing::debug;

use crate::traffic_ports::{Clock, RequestLogRepository};

#[cfg(test)]
mod tests;

/// Application service for the bounded request log.
#[derive(Clone)]
pub struct RequestLogService {
    repository: Arc<dyn RequestLogRepository>,
    clock: Arc<dyn Clock>,
}

impl RequestLogService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RequestLogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Stamps and appends an entry.
    pub async fn append(&self, entry: NewRequestLogEntry) -> AppResult<RequestLogEntry> {
        let entry = RequestLogEntry::stamped(RequestLogId::new(), self.clock.now_ms(), entry);
        self.repository.append(entry.clone()).await?;
        Ok(entry)
    }

    /// Records the outcome of an appended entry.
    ///
    /// Completing an entry that has already been evicted is not an error.
    pub async fn complete(&self, id: RequestLogId, completion: RequestCompletion) -> AppResult<()> {
        if !self.repository.complete(id, completion).await? {
            debug!(%id, "request log entry evicted before completion");
        }

        Ok(())
    }

    /// Returns matching entries, newest first, truncated to the filter limit.
    pub async fn query(&self, filter: &RequestLogFilter) -> AppResult<Vec<RequestLogEntry>> {
        let mut entries = self.repository.list_matching(filter).await?;
        entries.reverse();
        entries.sort_by(|left, right| right.timestamp_ms.cmp(&left.timestamp_ms));

        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }

    /// Returns the number of retained entries.
    pub async fn len(&self) -> AppResult<usize> {
        self.repository.len().await
    }
}
