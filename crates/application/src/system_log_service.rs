//! Operator-facing system log kept in memory for the admin dashboard.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use taskdeck_core::{AppResult, NonEmptyString};
use taskdeck_domain::{LogLevel, SystemLogEntry, SystemLogQuery};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::traffic_ports::{Clock, SystemLogRepository};


const RECENT_ACTIVITY_LIMIT: usize = 10;

const STARTUP_MESSAGES: &[(&str, &str)] = &[
    ("System logger initialized", "logger.service"),
    ("Task management API system started", "system.startup"),
    ("Authentication middleware loaded", "auth.middleware"),
    ("Rate limiting service active", "rate-limit.service"),
];

/// Payload for a new system log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemLogInput {
    /// Severity.
    pub level: LogLevel,
    /// Free-form message.
    pub message: String,
    /// Component name.
    pub source: String,
    /// Acting user, if any.
    pub user_id: Option<String>,
    /// Structured context.
    pub metadata: Option<Value>,
}

impl SystemLogInput {
    /// Creates a payload without user or metadata.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            source: source.into(),
            user_id: None,
            metadata: None,
        }
    }

    /// Attributes the entry to a user.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attaches structured context.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Condensed view of a recent entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLogActivity {
    /// Unix milliseconds.
    pub timestamp_ms: i64,
    /// Message.
    pub message: String,
    /// Severity.
    pub level: LogLevel,
}

/// Summary of the system log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLogStats {
    /// Entries considered.
    pub total: usize,
    /// Entry count for every level, zero included.
    pub by_level: BTreeMap<LogLevel, usize>,
    /// Newest entries, at most ten.
    pub recent_activity: Vec<SystemLogActivity>,
}

/// Application service for the system log.
#[derive(Clone)]
pub struct SystemLogService {
    repository: Arc<dyn SystemLogRepository>,
    clock: Arc<dyn Clock>,
}

impl SystemLogService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn SystemLogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Records an entry and mirrors it to the tracing subscriber.
    pub async fn log(&self, input: SystemLogInput) -> AppResult<SystemLogEntry> {
        let message = NonEmptyString::new(input.message)?;
        let source = NonEmptyString::new(input.source)?;

        let entry = SystemLogEntry {
            id: Uuid::new_v4(),
            timestamp_ms: self.clock.now_ms(),
            level: input.level,
            message: message.into(),
            source: source.into(),
            user_id: input.user_id,
            metadata: input.metadata,
        };

        emit(&entry);
        self.repository.append(entry.clone()).await?;

        Ok(entry)
    }

    /// Records an INFO entry.
    pub async fn info(
        &self,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> AppResult<SystemLogEntry> {
        self.log(SystemLogInput::new(LogLevel::Info, message, source))
            .await
    }

    /// Returns matching entries, newest first.
    pub async fn list(&self, query: &SystemLogQuery) -> AppResult<Vec<SystemLogEntry>> {
        self.repository.list(query).await
    }

    /// Summarizes entries written at or after `since_ms`.
    pub async fn stats(&self, since_ms: Option<i64>) -> AppResult<SystemLogStats> {
        let entries = self
            .repository
            .list(&SystemLogQuery {
                since_ms,
                ..SystemLogQuery::default()
            })
            .await?;

        let mut by_level: BTreeMap<LogLevel, usize> =
            LogLevel::all().iter().map(|level| (*level, 0)).collect();
        for entry in &entries {
            *by_level.entry(entry.level).or_default() += 1;
        }

        let recent_activity = entries
            .iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|entry| SystemLogActivity {
                timestamp_ms: entry.timestamp_ms,
                message: entry.message.clone(),
                level: entry.level,
            })
            .collect();

        Ok(SystemLogStats {
            total: entries.len(),
            by_level,
            recent_activity,
        })
    }

    /// Empties the log, leaving a single entry recording the purge.
    pub async fn clear(&self) -> AppResult<usize> {
        let removed = self.repository.clear().await?;
        self.info("System logs cleared", "logger.service").await?;
        Ok(removed)
    }

    /// Writes the start-up entries shown on a fresh dashboard.
    pub async fn record_startup(&self) -> AppResult<()> {
        for (message, source) in STARTUP_MESSAGES {
            self.info(*message, *source).await?;
        }

        Ok(())
    }
}

fn emit(entry: &SystemLogEntry) {
    let user_id = entry.user_id.as_deref().unwrap_or("-");
    match entry.level {
        LogLevel::Debug => debug!(source = %entry.source, user_id, "{}", entry.message),
        LogLevel::Info => info!(source = %entry.source, user_id, "{}", entry.message),
        LogLevel::Warn => warn!(source = %entry.source, user_id, "{}", entry.message),
        LogLevel::Error => error!(source = %entry.source, user_id, "{}", entry.message),
    }
}
