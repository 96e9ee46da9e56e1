use std::sync::Arc;

use taskdeck_domain::{NewRequestLogEntry, RequestCompletion, RequestLogFilter, RequestLogId};

use crate::test_support::{FakeClock, FakeRequestLogRepository};

use super::RequestLogService;

fn request(endpoint: &str, blocked: bool) -> NewRequestLogEntry {
    NewRequestLogEntry {
        method: "GET".to_owned(),
        endpoint: endpoint.to_owned(),
        client_ip: "10.0.0.1".to_owned(),
        blocked,
        ..NewRequestLogEntry::default()
    }
}

fn service() -> (RequestLogService, Arc<FakeClock>) {
    let clock = FakeClock::at(1_000);
    let service = RequestLogService::new(Arc::new(FakeRequestLogRepository::default()), clock.clone());
    (service, clock)
}

#[tokio::test]
async fn append_stamps_id_and_timestamp() {
    let (service, _) = service();

    let first = service
        .append(request("/api/tasks", false))
        .await
        .unwrap_or_else(|_| panic!("append"));
    let second = service
        .append(request("/api/tasks", false))
        .await
        .unwrap_or_else(|_| panic!("append"));

    assert_ne!(first.id, second.id);
    assert_eq!(first.timestamp_ms, 1_000);
    assert_eq!(first.response_time_ms, None);
}

#[tokio::test]
async fn query_is_newest_first_and_limited_after_sorting() {
    let (service, clock) = service();
    for endpoint in ["/a", "/b", "/c"] {
        let _ = service.append(request(endpoint, false)).await;
        clock.advance(10);
    }

    let entries = service
        .query(&RequestLogFilter {
            limit: Some(2),
            ..RequestLogFilter::default()
        })
        .await
        .unwrap_or_else(|_| panic!("query"));

    let endpoints: Vec<&str> = entries.iter().map(|entry| entry.endpoint.as_str()).collect();
    assert_eq!(endpoints, vec!["/c", "/b"]);
}

#[tokio::test]
async fn query_on_empty_log_or_future_since_is_empty() {
    let (service, _) = service();
    let empty = service
        .query(&RequestLogFilter::default())
        .await
        .unwrap_or_else(|_| panic!("query"));
    assert!(empty.is_empty());

    let _ = service.append(request("/a", true)).await;
    let future = service
        .query(&RequestLogFilter {
            since_ms: Some(5_000),
            ..RequestLogFilter::default()
        })
        .await
        .unwrap_or_else(|_| panic!("query"));
    assert!(future.is_empty());
}

#[tokio::test]
async fn complete_binds_outcome_once() {
    let (service, _) = service();
    let entry = service
        .append(request("/a", false))
        .await
        .unwrap_or_else(|_| panic!("append"));

    let result = service
        .complete(
            entry.id,
            RequestCompletion {
                status_code: 201,
                response_time_ms: 42,
                failure_reason: None,
            },
        )
        .await;
    assert!(result.is_ok());

    let stored = service
        .query(&RequestLogFilter::default())
        .await
        .unwrap_or_else(|_| panic!("query"));
    assert_eq!(stored[0].status_code, Some(201));
    assert_eq!(stored[0].response_time_ms, Some(42));
}

#[tokio::test]
async fn completing_unknown_entry_is_not_an_error() {
    let (service, _) = service();

    let result = service
        .complete(
            RequestLogId::new(),
            RequestCompletion {
                status_code: 200,
                response_time_ms: 1,
                failure_reason: None,
            },
        )
        .await;

    assert!(result.is_ok());
}
