use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

const USER_PREFIX: &str = "user:";
const IP_PREFIX: &str = "ip:";

/// Identity string a rate limit budget is tracked against.
///
/// Authenticated callers share one budget per endpoint across every address
/// they connect from; anonymous callers behind one address share theirs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    /// Derives `user:<id>:<endpoint>` when a user is known, else
    /// `ip:<address>:<endpoint>`.
    #[must_use]
    pub fn derive(client_ip: &str, endpoint: &str, user_id: Option<&str>) -> Self {
        match user_id {
            Some(user_id) => Self(format!("{USER_PREFIX}{user_id}:{endpoint}")),
            None => Self(format!("{IP_PREFIX}{client_ip}:{endpoint}")),
        }
    }

    /// Wraps a key produced by a custom key generator.
    #[must_use]
    pub fn custom(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RateLimitKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}
