use std::sync::Arc;

use taskdeck_core::AppError;
use taskdeck_domain::{RateLimitConfig, RateLimitKey};

use crate::test_support::{FakeClock, FakeRateLimitRepository};

use super::RateLimitService;

fn service(now_ms: i64) -> (RateLimitService, Arc<FakeClock>, Arc<FakeRateLimitRepository>) {
    let clock = FakeClock::at(now_ms);
    let repository = Arc::new(FakeRateLimitRepository::default());
    let service = RateLimitService::new(repository.clone(), clock.clone());
    (service, clock, repository)
}

#[tokio::test]
async fn unconfigured_endpoint_uses_default_policy() {
    let (service, _, _) = service(0);

    let config = service
        .get_config("/api/unknown")
        .await
        .unwrap_or_else(|_| panic!("config lookup"));

    assert_eq!(config, RateLimitConfig::default());
}

#[tokio::test]
async fn invalid_config_is_rejected_and_not_applied() {
    let (service, _, _) = service(0);
    assert!(service.set_config("/api/tasks", 60_000, 10).await.is_ok());

    let result = service.set_config("/api/tasks", 0, 10).await;
    assert!(matches!(result, Err(AppError::InvalidConfig(_))));

    let result = service.set_config("/api/tasks", 60_000, 0).await;
    assert!(matches!(result, Err(AppError::InvalidConfig(_))));

    let config = service
        .get_config("/api/tasks")
        .await
        .unwrap_or_else(|_| panic!("config lookup"));
    assert_eq!(config.max_requests(), 10);
}

#[tokio::test]
async fn window_resets_after_it_elapses() {
    let (service, clock, _) = service(1_000);
    let key = RateLimitKey::derive("1.1.1.1", "/api/tasks", None);

    for _ in 0..100 {
        let decision = service
            .check_rate_limit(&key, "/api/tasks")
            .await
            .unwrap_or_else(|_| panic!("check"));
        assert!(decision.allowed);
    }

    let denied = service
        .check_rate_limit(&key, "/api/tasks")
        .await
        .unwrap_or_else(|_| panic!("check"));
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);

    clock.advance(60_001);
    let after_reset = service
        .check_rate_limit(&key, "/api/tasks")
        .await
        .unwrap_or_else(|_| panic!("check"));
    assert!(after_reset.allowed);
    assert_eq!(after_reset.remaining, 99);
}

#[tokio::test]
async fn repeated_denials_do_not_consume_budget() {
    let (service, _, repository) = service(0);
    assert!(service.set_config("/api/x", 60_000, 3).await.is_ok());
    let key = RateLimitKey::derive("1.1.1.1", "/api/x", None);

    for _ in 0..10 {
        let _ = service.check_rate_limit(&key, "/api/x").await;
    }

    let entry = repository
        .entry(&key)
        .await
        .unwrap_or_else(|| panic!("entry stored"));
    assert_eq!(entry.count, 3);
}

#[tokio::test]
async fn keys_keep_independent_budgets() {
    let (service, _, _) = service(0);
    assert!(service.set_config("/api/x", 60_000, 2).await.is_ok());
    let user_a = RateLimitKey::derive("9.9.9.9", "/api/x", Some("A"));
    let user_b = RateLimitKey::derive("9.9.9.9", "/api/x", Some("B"));

    for _ in 0..3 {
        let _ = service.check_rate_limit(&user_a, "/api/x").await;
    }

    let decision = service
        .check_rate_limit(&user_b, "/api/x")
        .await
        .unwrap_or_else(|_| panic!("check"));
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 1);
}

#[tokio::test]
async fn login_policy_denies_sixth_attempt() {
    let (service, _, _) = service(0);
    assert!(service.set_config("/api/login", 900_000, 5).await.is_ok());
    let key = RateLimitKey::derive("1.2.3.4", "/api/login", None);

    let mut remaining = Vec::new();
    for _ in 0..5 {
        let decision = service
            .check_rate_limit(&key, "/api/login")
            .await
            .unwrap_or_else(|_| panic!("check"));
        assert!(decision.allowed);
        remaining.push(decision.remaining);
    }
    assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

    let denied = service
        .check_rate_limit(&key, "/api/login")
        .await
        .unwrap_or_else(|_| panic!("check"));
    assert!(!denied.allowed);
    assert!(
        denied
            .reason
            .as_deref()
            .is_some_and(|reason| reason.contains("Max 5 requests per 900s"))
    );
    assert!(denied.retry_after_seconds(0) > 0);
}

#[tokio::test]
async fn stale_entries_are_purged_on_check() {
    let (service, clock, repository) = service(0);
    let stale = RateLimitKey::derive("1.1.1.1", "/api/a", None);
    let fresh = RateLimitKey::derive("2.2.2.2", "/api/b", None);

    let _ = service.check_rate_limit(&stale, "/api/a").await;
    clock.advance(60_000 + 60_001);
    let _ = service.check_rate_limit(&fresh, "/api/b").await;

    assert!(repository.entry(&stale).await.is_none());
    assert!(repository.entry(&fresh).await.is_some());
}

#[tokio::test]
async fn current_status_lists_active_windows_busiest_first() {
    let (service, clock, _) = service(0);
    assert!(service.set_config("/api/a", 10_000, 5).await.is_ok());
    let quiet = RateLimitKey::derive("1.1.1.1", "/api/a", None);
    let busy = RateLimitKey::derive("2.2.2.2", "/api/a", None);
    let expired = RateLimitKey::derive("3.3.3.3", "/api/b", None);

    let _ = service.check_rate_limit(&expired, "/api/b").await;
    clock.advance(60_001);
    let _ = service.check_rate_limit(&quiet, "/api/a").await;
    for _ in 0..3 {
        let _ = service.check_rate_limit(&busy, "/api/a").await;
    }

    let statuses = service
        .current_status()
        .await
        .unwrap_or_else(|_| panic!("status"));

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].key, busy);
    assert_eq!(statuses[0].count, 3);
    assert_eq!(statuses[0].remaining, 2);
    assert_eq!(statuses[0].endpoint, "/api/a");
    assert_eq!(statuses[1].key, quiet);
}

#[tokio::test]
async fn reset_limits_only_touches_the_endpoint() {
    let (service, _, repository) = service(0);
    let target = RateLimitKey::derive("1.1.1.1", "/api/a", None);
    let by_user = RateLimitKey::derive("1.1.1.1", "/api/a", Some("u1"));
    let other = RateLimitKey::derive("1.1.1.1", "/api/b", None);

    for key in [&target, &by_user] {
        let _ = service.check_rate_limit(key, "/api/a").await;
    }
    let _ = service.check_rate_limit(&other, "/api/b").await;

    let removed = service
        .reset_limits("/api/a")
        .await
        .unwrap_or_else(|_| panic!("reset"));

    assert_eq!(removed, 2);
    assert!(repository.entry(&target).await.is_none());
    assert!(repository.entry(&other).await.is_some());
}

#[tokio::test]
async fn windows_keep_their_endpoint_whatever_the_key_looks_like() {
    let (service, _, _) = service(0);
    assert!(service.set_config("/api/auth/login", 60_000, 1).await.is_ok());
    let spoofed = RateLimitKey::derive("6.6.6.6:/x", "/api/auth/login", None);
    let custom = RateLimitKey::custom("tenant-7");

    let _ = service.check_rate_limit(&spoofed, "/api/auth/login").await;
    let _ = service.check_rate_limit(&custom, "/api/auth/login").await;

    let statuses = service
        .current_status()
        .await
        .unwrap_or_else(|_| panic!("status"));
    assert_eq!(statuses.len(), 2);
    for status in &statuses {
        assert_eq!(status.endpoint, "/api/auth/login");
        assert_eq!(status.remaining, 0);
    }

    let removed = service
        .reset_limits("/api/auth/login")
        .await
        .unwrap_or_else(|_| panic!("reset"));
    assert_eq!(removed, 2);

    let decision = service
        .check_rate_limit(&spoofed, "/api/auth/login")
        .await
        .unwrap_or_else(|_| panic!("check"));
    assert!(decision.allowed);
}

#[tokio::test]
async fn configured_default_applies_to_unknown_endpoints() {
    let (service, _, _) = service(0);
    let service = service.with_default_config(RateLimitConfig::STRICT);

    let key = RateLimitKey::derive("1.1.1.1", "/api/other", None);
    let decision = service
        .check_rate_limit(&key, "/api/other")
        .await
        .unwrap_or_else(|_| panic!("check"));

    assert_eq!(decision.limit, 10);
}
