use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskdeck_core::AppError;
use uuid::Uuid;

/// Default number of system log entries kept in memory.
pub const DEFAULT_SYSTEM_LOG_CAPACITY: usize = 1_000;

/// Severity of an operator-facing system log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Unexpected but handled.
    Warn,
    /// Failed operation.
    Error,
}

impl LogLevel {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Returns all levels, least severe first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[LogLevel] = &[
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ];

        ALL
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            _ => Err(AppError::Validation(format!(
                "unknown log level '{value}'"
            ))),
        }
    }
}

/// One entry of the in-memory system log shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemLogEntry {
    /// Unique entry id.
    pub id: Uuid,
    /// Unix milliseconds at which the entry was written.
    pub timestamp_ms: i64,
    /// Severity.
    pub level: LogLevel,
    /// Free-form message.
    pub message: String,
    /// Dotted component name, e.g. `rate-limit.service`.
    pub source: String,
    /// Acting user, if any.
    pub user_id: Option<String>,
    /// Structured context.
    pub metadata: Option<Value>,
}

/// Filter over system log entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemLogQuery {
    /// Exact level.
    pub level: Option<LogLevel>,
    /// Substring of the source.
    pub source: Option<String>,
    /// Inclusive lower bound on the timestamp.
    pub since_ms: Option<i64>,
    /// Maximum number of entries, newest first.
    pub limit: Option<usize>,
}

impl SystemLogQuery {
    /// Returns whether `entry` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, entry: &SystemLogEntry) -> bool {
        self.level.is_none_or(|level| entry.level == level)
            && self
                .source
                .as_deref()
                .is_none_or(|source| entry.source.contains(source))
            && self
                .since_ms
                .is_none_or(|since_ms| entry.timestamp_ms >= since_ms)
    }
}
