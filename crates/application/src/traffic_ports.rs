use async_trait::async_trait;
use taskdeck_core::{AppResult, UserIdentity};
use taskdeck_domain::{
    EndpointRoute, EndpointStatusEntry, RateLimitConfig, RateLimitDecision, RateLimitEntry,
    RateLimitKey, RequestCompletion, RequestLogEntry, RequestLogFilter, RequestLogId,
    SystemLogEntry, SystemLogQuery,
};

/// Source of the current time in unix milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current unix time in milliseconds.
    fn now_ms(&self) -> i64;
}

/// Port resolving bearer credentials into an identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies the credentials.
    ///
    /// Returns `Ok(None)` when the credentials are well-formed but no longer
    /// identify anyone, and an error when they cannot be trusted at all.
    async fn verify(&self, credentials: &str) -> AppResult<Option<UserIdentity>>;
}

/// Rate limit policy attached to an endpoint pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRateLimit {
    /// Endpoint pattern.
    pub endpoint: String,
    /// Policy applied to it.
    pub config: RateLimitConfig,
}

/// Window state stored for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRateLimit {
    /// Key the window belongs to.
    pub key: RateLimitKey,
    /// Endpoint whose policy governs the window.
    pub endpoint: String,
    /// Window state.
    pub entry: RateLimitEntry,
}

/// Repository port for rate limit policies and window state.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Replaces the policy for an endpoint.
    async fn save_config(&self, endpoint: &str, config: RateLimitConfig) -> AppResult<()>;

    /// Returns the explicit policy for an endpoint.
    async fn find_config(&self, endpoint: &str) -> AppResult<Option<RateLimitConfig>>;

    /// Lists every explicit policy.
    async fn list_configs(&self) -> AppResult<Vec<EndpointRateLimit>>;

    /// Applies one request to `key` and stores the resulting window under
    /// `endpoint`.
    ///
    /// Implementations must purge stale entries, evaluate and store under a
    /// single exclusive section so concurrent checks on a key cannot both
    /// observe the same count.
    async fn apply_request(
        &self,
        key: &RateLimitKey,
        endpoint: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> AppResult<RateLimitDecision>;

    /// Lists all stored windows, expired ones included.
    async fn list_entries(&self) -> AppResult<Vec<TrackedRateLimit>>;

    /// Drops every window stored under `endpoint`. Returns how many were
    /// dropped.
    async fn remove_entries_for_endpoint(&self, endpoint: &str) -> AppResult<usize>;
}

/// Repository port for the bounded request log.
#[async_trait]
pub trait RequestLogRepository: Send + Sync {
    /// Appends an entry, evicting the oldest ones beyond capacity.
    async fn append(&self, entry: RequestLogEntry) -> AppResult<()>;

    /// Fills in the outcome of an entry. Returns false when the entry is no
    /// longer retained.
    async fn complete(&self, id: RequestLogId, completion: RequestCompletion) -> AppResult<bool>;

    /// Returns every retained entry matching the filter, oldest first. The
    /// filter's `limit` is ignored.
    async fn list_matching(&self, filter: &RequestLogFilter) -> AppResult<Vec<RequestLogEntry>>;

    /// Returns the number of retained entries.
    async fn len(&self) -> AppResult<usize>;
}

/// Endpoint status stored for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointStatusRecord {
    /// Route the status applies to.
    pub route: EndpointRoute,
    /// Current status.
    pub entry: EndpointStatusEntry,
}

/// Repository port for operator-managed endpoint status.
#[async_trait]
pub trait EndpointStatusRepository: Send + Sync {
    /// Returns the stored status of a route.
    async fn find(&self, route: &EndpointRoute) -> AppResult<Option<EndpointStatusEntry>>;

    /// Stores the status of a route.
    async fn save(&self, route: EndpointRoute, entry: EndpointStatusEntry) -> AppResult<()>;

    /// Lists every stored status.
    async fn list(&self) -> AppResult<Vec<EndpointStatusRecord>>;
}

/// Repository port for the bounded system log.
#[async_trait]
pub trait SystemLogRepository: Send + Sync {
    /// Prepends an entry, dropping the oldest ones beyond capacity.
    async fn append(&self, entry: SystemLogEntry) -> AppResult<()>;

    /// Returns entries matching the query, newest first, honoring `limit`.
    async fn list(&self, query: &SystemLogQuery) -> AppResult<Vec<SystemLogEntry>>;

    /// Removes every entry. Returns how many were removed.
    async fn clear(&self) -> AppResult<usize>;
}
