//! Records of intercepted requests and the filters used to query them.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of request log entries kept in memory.
pub const DEFAULT_REQUEST_LOG_CAPACITY: usize = 10_000;

/// Unique identifier for a request log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestLogId(Uuid);

impl RequestLogId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestLogId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Request outcome as reported by the interceptor, before id and timestamp
/// are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRequestLogEntry {
    /// HTTP method.
    pub method: String,
    /// Logical route pattern, not the concrete path.
    pub endpoint: String,
    /// Client address derived from forwarding headers.
    pub client_ip: String,
    /// User-Agent header, if sent.
    pub user_agent: Option<String>,
    /// Authenticated user, if any.
    pub user_id: Option<String>,
    /// Handler latency, when already known.
    pub response_time_ms: Option<u64>,
    /// Response status, when already known.
    pub status_code: Option<u16>,
    /// Whether the request was denied before reaching its handler.
    pub blocked: bool,
    /// Denial or failure reason.
    pub reason: Option<String>,
}

/// Late-bound outcome of a request whose handler has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCompletion {
    /// Final response status.
    pub status_code: u16,
    /// Handler latency.
    pub response_time_ms: u64,
    /// Error message when the handler failed.
    pub failure_reason: Option<String>,
}

/// Immutable record of one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    /// Unique entry id.
    pub id: RequestLogId,
    /// HTTP method.
    pub method: String,
    /// Logical route pattern.
    pub endpoint: String,
    /// Client address.
    pub client_ip: String,
    /// User-Agent header, if sent.
    pub user_agent: Option<String>,
    /// Authenticated user, if any.
    pub user_id: Option<String>,
    /// Unix milliseconds at which the request was intercepted.
    pub timestamp_ms: i64,
    /// Handler latency; absent while the request is in flight.
    pub response_time_ms: Option<u64>,
    /// Response status; absent while the request is in flight.
    pub status_code: Option<u16>,
    /// Whether the request was denied before reaching its handler.
    pub blocked: bool,
    /// Denial or failure reason.
    pub reason: Option<String>,
}

impl RequestLogEntry {
    /// Stamps a new entry with its id and interception time.
    #[must_use]
    pub fn stamped(id: RequestLogId, timestamp_ms: i64, entry: NewRequestLogEntry) -> Self {
        Self {
            id,
            method: entry.method,
            endpoint: entry.endpoint,
            client_ip: entry.client_ip,
            user_agent: entry.user_agent,
            user_id: entry.user_id,
            timestamp_ms,
            response_time_ms: entry.response_time_ms,
            status_code: entry.status_code,
            blocked: entry.blocked,
            reason: entry.reason,
        }
    }

    /// Fills in the handler outcome. This is the only mutation an entry sees
    /// after it has been appended.
    pub fn complete(&mut self, completion: RequestCompletion) {
        self.status_code = Some(completion.status_code);
        self.response_time_ms = Some(completion.response_time_ms);
        if completion.failure_reason.is_some() {
            self.reason = completion.failure_reason;
        }
    }
}

/// Conjunctive filter over request log entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestLogFilter {
    /// Exact endpoint pattern.
    pub endpoint: Option<String>,
    /// Exact client address.
    pub ip: Option<String>,
    /// Exact user id.
    pub user_id: Option<String>,
    /// Blocked flag.
    pub blocked: Option<bool>,
    /// Inclusive lower bound on the timestamp.
    pub since_ms: Option<i64>,
    /// Maximum number of entries, applied after newest-first sorting.
    pub limit: Option<usize>,
}

impl RequestLogFilter {
    /// Returns whether `entry` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, entry: &RequestLogEntry) -> bool {
        self.endpoint
            .as_deref()
            .is_none_or(|endpoint| entry.endpoint == endpoint)
            && self.ip.as_deref().is_none_or(|ip| entry.client_ip == ip)
            && self
                .user_id
                .as_deref()
                .is_none_or(|user_id| entry.user_id.as_deref() == Some(user_id))
            && self.blocked.is_none_or(|blocked| entry.blocked == blocked)
            && self
                .since_ms
                .is_none_or(|since_ms| entry.timestamp_ms >= since_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        NewRequestLogEntry, RequestCompletion, RequestLogEntry, RequestLogFilter, RequestLogId,
    };

    fn entry(endpoint: &str, ip: &str, blocked: bool, timestamp_ms: i64) -> RequestLogEntry {
        RequestLogEntry::stamped(
            RequestLogId::new(),
            timestamp_ms,
            NewRequestLogEntry {
                method: "GET".to_owned(),
                endpoint: endpoint.to_owned(),
                client_ip: ip.to_owned(),
                blocked,
                ..NewRequestLogEntry::default()
            },
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(RequestLogFilter::default().matches(&entry("/api/tasks", "1.1.1.1", true, 0)));
    }

    #[test]
    fn filter_criteria_are_conjunctive() {
        let filter = RequestLogFilter {
            endpoint: Some("/api/tasks".to_owned()),
            blocked: Some(true),
            ..RequestLogFilter::default()
        };

        assert!(filter.matches(&entry("/api/tasks", "1.1.1.1", true, 0)));
        assert!(!filter.matches(&entry("/api/tasks", "1.1.1.1", false, 0)));
        assert!(!filter.matches(&entry("/api/users", "1.1.1.1", true, 0)));
    }

    #[test]
    fn since_is_inclusive_and_user_filter_skips_anonymous() {
        let filter = RequestLogFilter {
            since_ms: Some(100),
            ..RequestLogFilter::default()
        };
        assert!(filter.matches(&entry("/a", "ip", false, 100)));
        assert!(!filter.matches(&entry("/a", "ip", false, 99)));

        let by_user = RequestLogFilter {
            user_id: Some("u1".to_owned()),
            ..RequestLogFilter::default()
        };
        assert!(!by_user.matches(&entry("/a", "ip", false, 0)));
    }

    #[test]
    fn completion_keeps_existing_reason_unless_failed() {
        let mut logged = entry("/a", "ip", false, 0);
        logged.complete(RequestCompletion {
            status_code: 200,
            response_time_ms: 12,
            failure_reason: None,
        });
        assert_eq!(logged.status_code, Some(200));
        assert_eq!(logged.response_time_ms, Some(12));
        assert_eq!(logged.reason, None);

        logged.complete(RequestCompletion {
            status_code: 500,
            response_time_ms: 14,
            failure_reason: Some("boom".to_owned()),
        });
        assert_eq!(logged.reason.as_deref(), Some("boom"));
    }
}
