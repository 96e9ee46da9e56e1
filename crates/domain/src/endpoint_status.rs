use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use taskdeck_core::{AppError, AppResult};

/// Operational switch for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointAvailability {
    /// Requests reach the rate limiter and handler.
    Active,
    /// Requests are refused until re-enabled.
    Disabled,
    /// Requests are refused while operators work on the endpoint.
    Maintenance,
}

impl EndpointAvailability {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Disabled => "Disabled",
            Self::Maintenance => "Maintenance",
        }
    }

    /// Returns the message shown to refused callers, if requests are refused.
    #[must_use]
    pub fn unavailable_message(&self) -> Option<&'static str> {
        match self {
            Self::Active => None,
            Self::Disabled => Some("This API endpoint has been disabled"),
            Self::Maintenance => {
                Some("This API endpoint is under maintenance. Please try again later")
            }
        }
    }

    /// Returns the request log reason for refused requests.
    #[must_use]
    pub fn blocked_reason(&self) -> Option<&'static str> {
        match self {
            Self::Active => None,
            Self::Disabled => Some("Endpoint disabled"),
            Self::Maintenance => Some("Endpoint under maintenance"),
        }
    }
}

impl FromStr for EndpointAvailability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Active" => Ok(Self::Active),
            "Disabled" => Ok(Self::Disabled),
            "Maintenance" => Ok(Self::Maintenance),
            _ => Err(AppError::Validation(format!(
                "unknown endpoint status '{value}'"
            ))),
        }
    }
}

/// Method and route pattern identifying an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointRoute {
    method: String,
    path: String,
}

impl EndpointRoute {
    /// Creates a route; the method is upper-cased and the path must start
    /// with `/`.
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> AppResult<Self> {
        let method = method.as_ref().trim().to_ascii_uppercase();
        let path = path.into();

        if method.is_empty() {
            return Err(AppError::Validation(
                "endpoint method must not be empty".to_owned(),
            ));
        }

        if !path.starts_with('/') {
            return Err(AppError::Validation(format!(
                "endpoint path '{path}' must start with '/'"
            )));
        }

        Ok(Self { method, path })
    }

    /// Returns the upper-cased HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Returns the route pattern.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }
}

impl Display for EndpointRoute {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.method, self.path)
    }
}

/// Operator-managed state of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStatusEntry {
    /// Whether requests are served.
    pub status: EndpointAvailability,
    /// Advertised request budget shown on the dashboard.
    pub rate_limit: u32,
    /// Whether the endpoint is documented as requiring authentication.
    pub requires_auth: bool,
}

impl Default for EndpointStatusEntry {
    fn default() -> Self {
        Self {
            status: EndpointAvailability::Active,
            rate_limit: 100,
            requires_auth: true,
        }
    }
}

impl EndpointStatusEntry {
    /// Returns a copy with the set fields of `update` applied.
    #[must_use]
    pub fn merged(self, update: &EndpointStatusUpdate) -> Self {
        Self {
            status: update.status.unwrap_or(self.status),
            rate_limit: update.rate_limit.unwrap_or(self.rate_limit),
            requires_auth: update.requires_auth.unwrap_or(self.requires_auth),
        }
    }
}

/// Partial update of an endpoint's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndpointStatusUpdate {
    /// New availability.
    pub status: Option<EndpointAvailability>,
    /// New advertised budget.
    pub rate_limit: Option<u32>,
    /// New authentication flag.
    pub requires_auth: Option<bool>,
}
