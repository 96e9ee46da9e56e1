use serde::{Deserialize, Serialize};
use taskdeck_application::EndpointStatusRecord;
use ts_rs::TS;

/// API representation of an endpoint's operational state.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/endpoint-status-response.ts"
)]
pub struct EndpointStatusResponse {
    pub key: String,
    pub method: String,
    pub path: String,
    pub status: String,
    pub rate_limit: u32,
    pub requires_auth: bool,
}

impl From<EndpointStatusRecord> for EndpointStatusResponse {
    fn from(value: EndpointStatusRecord) -> Self {
        Self {
            key: value.route.to_string(),
            method: value.route.method().to_owned(),
            path: value.route.path().to_owned(),
            status: value.entry.status.as_str().to_owned(),
            rate_limit: value.entry.rate_limit,
            requires_auth: value.entry.requires_auth,
        }
    }
}

/// Incoming partial update of an endpoint's state.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-endpoint-status-request.ts"
)]
pub struct UpdateEndpointStatusRequest {
    pub method: Option<String>,
    pub path: Option<String>,
    pub status: Option<String>,
    pub rate_limit: Option<u32>,
    pub requires_auth: Option<bool>,
}

/// Body returned when an endpoint refuses requests.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/endpoint-unavailable-response.ts"
)]
pub struct EndpointUnavailableResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    pub status: String,
}
