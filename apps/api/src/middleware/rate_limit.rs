use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use taskdeck_application::TrafficGuard;
use taskdeck_domain::{
    EndpointAvailability, NewRequestLogEntry, RateLimitDecision, RateLimitKey,
    RequestCompletion, RequestLogId,
};
use tokio::runtime::Handle;
use tracing::warn;

use super::bearer_token;
use crate::dto::{EndpointUnavailableResponse, RateLimitExceededResponse};
use crate::error::{ApiError, HandlerFailure};


const FALLBACK_CLIENT_IP: &str = "127.0.0.1";
const CLIENT_IP_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];
const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Derives the limiter key of a request for a given endpoint.
pub type KeyGenerator = Arc<dyn Fn(&Request, &str) -> RateLimitKey + Send + Sync>;

/// Selects requests that bypass the limiter.
pub type SkipPredicate = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Builds the response sent to callers that exceeded their budget.
pub type RateLimitResponder = Arc<dyn Fn(&RateLimitDecision) -> Response + Send + Sync>;

/// Per-route overrides of the interceptor.
#[derive(Clone, Default)]
pub struct RateLimitOptions {
    pub key_generator: Option<KeyGenerator>,
    pub skip_when: Option<SkipPredicate>,
    pub on_rate_limit_exceeded: Option<RateLimitResponder>,
}

#[derive(Clone)]
struct RateLimitLayerState {
    guard: TrafficGuard,
    endpoint: Arc<str>,
    options: RateLimitOptions,
}

/// Wraps every route of `router` with the rate limiting interceptor.
///
/// `endpoint` names the routes in limiter policies, endpoint statuses and
/// the request log, so it must be a path such as `/api/tasks`.
pub fn with_rate_limit<S>(
    router: Router<S>,
    guard: TrafficGuard,
    endpoint: impl Into<String>,
    options: RateLimitOptions,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let layer_state = RateLimitLayerState {
        guard,
        endpoint: Arc::from(endpoint.into()),
        options,
    };

    router.route_layer(from_fn_with_state(layer_state, rate_limit))
}

/// Resolves the caller address from proxy headers, first non-empty wins.
pub fn client_ip(headers: &HeaderMap) -> String {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(FALLBACK_CLIENT_IP)
        .to_owned()
}

struct RequestContext {
    method: String,
    endpoint: String,
    client_ip: String,
    user_agent: Option<String>,
    user_id: Option<String>,
}

impl RequestContext {
    fn capture(request: &Request, endpoint: &str) -> Self {
        let headers = request.headers();
        Self {
            method: request.method().as_str().to_owned(),
            endpoint: endpoint.to_owned(),
            client_ip: client_ip(headers),
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned),
            user_id: None,
        }
    }

    fn pending(&self) -> NewRequestLogEntry {
        NewRequestLogEntry {
            method: self.method.clone(),
            endpoint: self.endpoint.clone(),
            client_ip: self.client_ip.clone(),
            user_agent: self.user_agent.clone(),
            user_id: self.user_id.clone(),
            ..NewRequestLogEntry::default()
        }
    }

    fn blocked(&self, status: StatusCode, reason: String, started: Instant) -> NewRequestLogEntry {
        NewRequestLogEntry {
            response_time_ms: Some(elapsed_ms(started)),
            status_code: Some(status.as_u16()),
            blocked: true,
            reason: Some(reason),
            ..self.pending()
        }
    }
}

async fn rate_limit(
    State(layer): State<RateLimitLayerState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let guard = &layer.guard;
    let endpoint = layer.endpoint.as_ref();
    let mut context = RequestContext::capture(&request, endpoint);

    if layer
        .options
        .skip_when
        .as_ref()
        .is_some_and(|skip| skip(&request))
    {
        return run_logged(guard, &context, None, request, next, started).await;
    }

    let availability = match guard
        .endpoint_statuses()
        .get(&context.method, endpoint)
        .await
    {
        Ok(entry) => entry.status,
        Err(error) => return ApiError::from(error).into_response(),
    };
    if let Some(message) = availability.unavailable_message() {
        warn!(
            method = %context.method,
            endpoint,
            status = availability.as_str(),
            "endpoint unavailable"
        );
        let reason = availability.blocked_reason().unwrap_or(message).to_owned();
        record(
            guard,
            context.blocked(StatusCode::SERVICE_UNAVAILABLE, reason, started),
        )
        .await;
        return unavailable_response(availability, message);
    }

    let token = bearer_token(request.headers()).map(ToOwned::to_owned);
    context.user_id = guard
        .identify(token.as_deref())
        .await
        .map(|identity| identity.user_id().to_owned());

    let key = match layer.options.key_generator.as_ref() {
        Some(generate) => generate(&request, endpoint),
        None => RateLimitKey::derive(&context.client_ip, endpoint, context.user_id.as_deref()),
    };

    let decision = match guard.rate_limits().check_rate_limit(&key, endpoint).await {
        Ok(decision) => decision,
        Err(error) => return ApiError::from(error).into_response(),
    };

    if !decision.allowed {
        let reason = decision
            .reason
            .clone()
            .unwrap_or_else(|| "Rate limit exceeded".to_owned());
        record(
            guard,
            context.blocked(StatusCode::TOO_MANY_REQUESTS, reason, started),
        )
        .await;

        return match layer.options.on_rate_limit_exceeded.as_ref() {
            Some(respond) => respond(&decision),
            None => too_many_requests(&decision, guard.now_ms()),
        };
    }

    run_logged(guard, &context, Some(&decision), request, next, started).await
}

async fn run_logged(
    guard: &TrafficGuard,
    context: &RequestContext,
    decision: Option<&RateLimitDecision>,
    request: Request,
    next: Next,
    started: Instant,
) -> Response {
    let pending = PendingEntry {
        guard: guard.clone(),
        entry_id: record(guard, context.pending()).await,
        endpoint: context.endpoint.clone(),
        started,
    };
    let mut response = next.run(request).await;
    let entry_id = pending.settle();

    let failure = response.extensions().get::<HandlerFailure>().cloned();
    let completion = match failure.as_ref() {
        Some(HandlerFailure(reason)) => RequestCompletion {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            response_time_ms: elapsed_ms(started),
            failure_reason: Some(reason.clone()),
        },
        None => RequestCompletion {
            status_code: response.status().as_u16(),
            response_time_ms: elapsed_ms(started),
            failure_reason: None,
        },
    };

    if let Some(entry_id) = entry_id
        && let Err(error) = guard.request_logs().complete(entry_id, completion).await
    {
        warn!(%error, endpoint = %context.endpoint, "failed to complete request log entry");
    }

    if failure.is_none()
        && let Some(decision) = decision
    {
        insert_rate_limit_headers(response.headers_mut(), decision);
    }

    response
}

/// Log entry appended before the handler ran. Dropping it unsettled means
/// the handler future was cancelled, so the entry is completed as 499.
struct PendingEntry {
    guard: TrafficGuard,
    entry_id: Option<RequestLogId>,
    endpoint: String,
    started: Instant,
}

impl PendingEntry {
    fn settle(mut self) -> Option<RequestLogId> {
        self.entry_id.take()
    }
}

impl Drop for PendingEntry {
    fn drop(&mut self) {
        let Some(entry_id) = self.entry_id.take() else {
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            return;
        };

        let guard = self.guard.clone();
        let endpoint = std::mem::take(&mut self.endpoint);
        let completion = RequestCompletion {
            status_code: CLIENT_CLOSED_REQUEST,
            response_time_ms: elapsed_ms(self.started),
            failure_reason: Some("Client closed request".to_owned()),
        };
        runtime.spawn(async move {
            if let Err(error) = guard.request_logs().complete(entry_id, completion).await {
                warn!(%error, endpoint, "failed to complete cancelled request log entry");
            }
        });
    }
}

async fn record(guard: &TrafficGuard, entry: NewRequestLogEntry) -> Option<RequestLogId> {
    let endpoint = entry.endpoint.clone();
    match guard.request_logs().append(entry).await {
        Ok(stored) => Some(stored.id),
        Err(error) => {
            warn!(%error, endpoint, "failed to append request log entry");
            None
        }
    }
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(
        RATE_LIMIT_RESET,
        HeaderValue::from(decision.reset_at_unix_seconds()),
    );
}

fn too_many_requests(decision: &RateLimitDecision, now_ms: i64) -> Response {
    let retry_after = decision.retry_after_seconds(now_ms);
    let body = RateLimitExceededResponse {
        success: false,
        error: "Too Many Requests",
        message: decision
            .reason
            .clone()
            .unwrap_or_else(|| "Rate limit exceeded".to_owned()),
        retry_after,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    let headers = response.headers_mut();
    insert_rate_limit_headers(headers, decision);
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

fn unavailable_response(availability: EndpointAvailability, message: &str) -> Response {
    let body = EndpointUnavailableResponse {
        success: false,
        error: message.to_owned(),
        code: "ENDPOINT_UNAVAILABLE",
        status: availability.as_str().to_owned(),
    };

    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
