//! On-demand traffic analytics computed by scanning the request log.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use taskdeck_core::{AppError, AppResult};
use taskdeck_domain::{RequestLogEntry, RequestLogFilter};

use crate::RequestLogService;
use crate::traffic_ports::Clock;


/// Window used by the dashboard when none is requested.
pub const DEFAULT_ANALYTICS_WINDOW_MS: u64 = 3_600_000;

const MINUTE_MS: i64 = 60_000;
const TOP_LIMIT: usize = 10;

/// Request counts for one minute bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteTraffic {
    /// Unix milliseconds at the start of the minute.
    pub minute_start_ms: i64,
    /// Requests intercepted in the minute.
    pub count: usize,
    /// Requests blocked in the minute.
    pub blocked: usize,
}

/// Request counts attributed to one endpoint or client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficCount {
    /// Endpoint pattern or client address.
    pub name: String,
    /// Requests intercepted.
    pub count: usize,
    /// Requests blocked.
    pub blocked: usize,
}

/// Aggregated view over the request log for one time window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrafficAnalytics {
    /// Per-minute counts in ascending time order, gaps zero-filled.
    pub requests_per_minute: Vec<MinuteTraffic>,
    /// Busiest endpoints, at most ten.
    pub top_endpoints: Vec<TrafficCount>,
    /// Busiest client addresses, at most ten.
    pub top_ips: Vec<TrafficCount>,
    /// Requests in the window.
    pub total_requests: usize,
    /// Blocked requests in the window.
    pub total_blocked: usize,
    /// Mean handler latency over completed requests, rounded.
    pub average_response_time_ms: u64,
}

/// Application service computing traffic analytics.
#[derive(Clone)]
pub struct TrafficAnalyticsService {
    request_logs: RequestLogService,
    clock: Arc<dyn Clock>,
}

impl TrafficAnalyticsService {
    /// Creates the service over a request log.
    #[must_use]
    pub fn new(request_logs: RequestLogService, clock: Arc<dyn Clock>) -> Self {
        Self {
            request_logs,
            clock,
        }
    }

    /// Aggregates every entry intercepted within the last `window_ms`.
    pub async fn get_analytics(&self, window_ms: u64) -> AppResult<TrafficAnalytics> {
        if window_ms == 0 {
            return Err(AppError::Validation(
                "analytics window must be greater than zero".to_owned(),
            ));
        }

        let now_ms = self.clock.now_ms();
        let since_ms = now_ms.saturating_sub(i64::try_from(window_ms).unwrap_or(i64::MAX));
        let entries = self
            .request_logs
            .query(&RequestLogFilter {
                since_ms: Some(since_ms),
                ..RequestLogFilter::default()
            })
            .await?;

        Ok(summarize(&entries, now_ms))
    }
}

fn summarize(entries: &[RequestLogEntry], now_ms: i64) -> TrafficAnalytics {
    let mut minutes: BTreeMap<i64, (usize, usize)> = BTreeMap::new();
    let mut endpoints: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut ips: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut total_blocked = 0;
    let mut latency_sum: u128 = 0;
    let mut latency_count: u128 = 0;

    for entry in entries {
        let blocked = usize::from(entry.blocked);
        total_blocked += blocked;

        for counts in [
            minutes
                .entry(minute_start(entry.timestamp_ms))
                .or_default(),
            endpoints.entry(entry.endpoint.as_str()).or_default(),
            ips.entry(entry.client_ip.as_str()).or_default(),
        ] {
            counts.0 += 1;
            counts.1 += blocked;
        }

        if let Some(response_time_ms) = entry.response_time_ms {
            latency_sum += u128::from(response_time_ms);
            latency_count += 1;
        }
    }

    let average_response_time_ms = if latency_count == 0 {
        0
    } else {
        u64::try_from((latency_sum + latency_count / 2) / latency_count).unwrap_or(u64::MAX)
    };

    TrafficAnalytics {
        requests_per_minute: zero_filled(&minutes, minute_start(now_ms)),
        top_endpoints: top_counts(endpoints),
        top_ips: top_counts(ips),
        total_requests: entries.len(),
        total_blocked,
        average_response_time_ms,
    }
}

fn minute_start(timestamp_ms: i64) -> i64 {
    timestamp_ms.div_euclid(MINUTE_MS) * MINUTE_MS
}

fn zero_filled(minutes: &BTreeMap<i64, (usize, usize)>, current_minute: i64) -> Vec<MinuteTraffic> {
    let (Some((&first, _)), Some((&last, _))) = (minutes.first_key_value(), minutes.last_key_value())
    else {
        return Vec::new();
    };

    let last = last.max(current_minute);
    let mut series = Vec::new();
    let mut minute = first;
    while minute <= last {
        let (count, blocked) = minutes.get(&minute).copied().unwrap_or_default();
        series.push(MinuteTraffic {
            minute_start_ms: minute,
            count,
            blocked,
        });
        minute += MINUTE_MS;
    }

    series
}

fn top_counts(counts: HashMap<&str, (usize, usize)>) -> Vec<TrafficCount> {
    let mut ranked: Vec<TrafficCount> = counts
        .into_iter()
        .map(|(name, (count, blocked))| TrafficCount {
            name: name.to_owned(),
            count,
            blocked,
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| left.name.cmp(&right.name))
    });
    ranked.truncate(TOP_LIMIT);
    ranked
}
