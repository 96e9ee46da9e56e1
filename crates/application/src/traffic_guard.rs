use std::sync::Arc;

use taskdeck_core::{AppResult, UserIdentity};
use tracing::debug;

use crate::traffic_ports::{Clock, EndpointRateLimit, IdentityVerifier};
use crate::{
    EndpointStatusService, RateLimitService, RequestLogService, TrafficAnalyticsService,
};

/// Limiter and request log totals shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficTotals {
    /// Keys holding window state.
    pub active_rate_limits: usize,
    /// Endpoints with an explicit policy.
    pub total_endpoints: usize,
    /// Retained request log entries.
    pub total_requests: usize,
    /// Explicit policies ordered by endpoint.
    pub configured_endpoints: Vec<EndpointRateLimit>,
}

/// Everything the request interceptor needs, built once in the composition
/// root and shared by every guarded route.
#[derive(Clone)]
pub struct TrafficGuard {
    rate_limits: RateLimitService,
    request_logs: RequestLogService,
    endpoint_statuses: EndpointStatusService,
    analytics: TrafficAnalyticsService,
    identity_verifier: Option<Arc<dyn IdentityVerifier>>,
    clock: Arc<dyn Clock>,
}

impl TrafficGuard {
    /// Bundles the traffic services.
    #[must_use]
    pub fn new(
        rate_limits: RateLimitService,
        request_logs: RequestLogService,
        endpoint_statuses: EndpointStatusService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let analytics = TrafficAnalyticsService::new(request_logs.clone(), clock.clone());
        Self {
            rate_limits,
            request_logs,
            endpoint_statuses,
            analytics,
            identity_verifier: None,
            clock,
        }
    }

    /// Resolves bearer tokens into identities so authenticated callers are
    /// keyed by user.
    #[must_use]
    pub fn with_identity_verifier(mut self, identity_verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.identity_verifier = Some(identity_verifier);
        self
    }

    /// Returns the limiter.
    #[must_use]
    pub fn rate_limits(&self) -> &RateLimitService {
        &self.rate_limits
    }

    /// Returns the request log.
    #[must_use]
    pub fn request_logs(&self) -> &RequestLogService {
        &self.request_logs
    }

    /// Returns the endpoint status registry.
    #[must_use]
    pub fn endpoint_statuses(&self) -> &EndpointStatusService {
        &self.endpoint_statuses
    }

    /// Returns the analytics engine.
    #[must_use]
    pub fn analytics(&self) -> &TrafficAnalyticsService {
        &self.analytics
    }

    /// Returns the current unix time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Resolves a bearer token, treating every failure as anonymous.
    pub async fn identify(&self, token: Option<&str>) -> Option<UserIdentity> {
        let (Some(verifier), Some(token)) = (self.identity_verifier.as_ref(), token) else {
            return None;
        };

        match verifier.verify(token).await {
            Ok(identity) => identity,
            Err(error) => {
                debug!(%error, "ignoring unverifiable credentials");
                None
            }
        }
    }

    /// Returns limiter and request log totals.
    pub async fn total_stats(&self) -> AppResult<TrafficTotals> {
        let configured_endpoints = self.rate_limits.list_configs().await?;

        Ok(TrafficTotals {
            active_rate_limits: self.rate_limits.tracked_keys().await?,
            total_endpoints: configured_endpoints.len(),
            total_requests: self.request_logs.len().await?,
            configured_endpoints,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use taskdeck_core::{AppError, AppResult, UserIdentity, UserRole};
    use taskdeck_domain::{NewRequestLogEntry, RateLimitKey};

    use crate::test_support::{
        FakeClock, FakeEndpointStatusRepository, FakeRateLimitRepository,
        FakeRequestLogRepository,
    };
    use crate::traffic_ports::IdentityVerifier;
    use crate::{EndpointStatusService, RateLimitService, RequestLogService};

    use super::TrafficGuard;

    struct FixedVerifier;

    #[async_trait]
    impl IdentityVerifier for FixedVerifier {
        async fn verify(&self, credentials: &str) -> AppResult<Option<UserIdentity>> {
            match credentials {
                "good" => Ok(Some(UserIdentity::new("u1", None, UserRole::Admin))),
                "expired" => Ok(None),
                _ => Err(AppError::Unauthorized("bad token".to_owned())),
            }
        }
    }

    fn guard() -> TrafficGuard {
        let clock = FakeClock::at(0);
        TrafficGuard::new(
            RateLimitService::new(Arc::new(FakeRateLimitRepository::default()), clock.clone()),
            RequestLogService::new(Arc::new(FakeRequestLogRepository::default()), clock.clone()),
            EndpointStatusService::new(Arc::new(FakeEndpointStatusRepository::default())),
            clock,
        )
    }

    #[tokio::test]
    async fn identify_swallows_verification_failures() {
        let guard = guard().with_identity_verifier(Arc::new(FixedVerifier));

        assert!(guard.identify(Some("good")).await.is_some());
        assert!(guard.identify(Some("expired")).await.is_none());
        assert!(guard.identify(Some("forged")).await.is_none());
        assert!(guard.identify(None).await.is_none());
    }

    #[tokio::test]
    async fn identify_without_verifier_is_anonymous() {
        assert!(guard().identify(Some("good")).await.is_none());
    }

    #[tokio::test]
    async fn total_stats_combine_limiter_and_log() {
        let guard = guard();
        assert!(guard.rate_limits().apply_default_configs().await.is_ok());
        let key = RateLimitKey::derive("1.1.1.1", "/api/tasks", None);
        let _ = guard.rate_limits().check_rate_limit(&key, "/api/tasks").await;
        let _ = guard
            .request_logs()
            .append(NewRequestLogEntry::default())
            .await;

        let totals = guard
            .total_stats()
            .await
            .unwrap_or_else(|_| panic!("totals"));

        assert_eq!(totals.active_rate_limits, 1);
        assert_eq!(totals.total_endpoints, 3);
        assert_eq!(totals.total_requests, 1);
        assert_eq!(totals.configured_endpoints[0].endpoint, "/api/auth/login");
    }
}
