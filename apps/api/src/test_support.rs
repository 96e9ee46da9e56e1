use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, header};
use axum::response::Response;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use taskdeck_application::{
    EndpointStatusService, RateLimitService, RequestLogService, SystemLogService, TrafficGuard,
};
use taskdeck_infrastructure::{
    InMemoryEndpointStatusRepository, InMemoryRateLimitRepository, InMemoryRequestLogRepository,
    InMemorySystemLogRepository, JwtIdentityVerifier, ManualClock,
};

use crate::state::AppState;

pub(crate) const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub(crate) const START_MS: i64 = 1_700_000_000_000;

pub(crate) struct TestContext {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

pub(crate) fn test_context() -> TestContext {
    let clock = Arc::new(ManualClock::new(START_MS));

    let verifier =
        JwtIdentityVerifier::new(TEST_SECRET).unwrap_or_else(|_| panic!("jwt verifier"));
    let traffic_guard = TrafficGuard::new(
        RateLimitService::new(Arc::new(InMemoryRateLimitRepository::new()), clock.clone()),
        RequestLogService::new(
            Arc::new(InMemoryRequestLogRepository::default()),
            clock.clone(),
        ),
        EndpointStatusService::new(Arc::new(InMemoryEndpointStatusRepository::new())),
        clock.clone(),
    )
    .with_identity_verifier(Arc::new(verifier));

    let system_log_service = SystemLogService::new(
        Arc::new(InMemorySystemLogRepository::default()),
        clock.clone(),
    );

    TestContext {
        state: AppState {
            traffic_guard,
            system_log_service,
        },
        clock,
    }
}

pub(crate) fn access_token(user_id: &str, role: &str) -> String {
    let claims = json!({
        "sub": user_id,
        "email": format!("{user_id}@taskdeck.test"),
        "role": role,
        "exp": chrono::Utc::now().timestamp() + 3_600,
    });

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap_or_else(|_| panic!("encode token"))
}

pub(crate) fn request(method: Method, uri: &str, ip: &str, token: Option<&str>) -> Request<Body> {
    request_with_body(method, uri, ip, token, None)
}

pub(crate) fn request_with_body(
    method: Method,
    uri: &str,
    ip: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", ip);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    builder
        .body(body)
        .unwrap_or_else(|_| panic!("request should build"))
}

pub(crate) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|_| panic!("body should be readable"));
    serde_json::from_slice(&bytes).unwrap_or_else(|_| panic!("body should be json"))
}

pub(crate) fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}
