use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Dashboard roles carried in verified credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular task owner.
    User,
    /// Operator with access to the admin surface.
    Admin,
    /// Operator allowed to run destructive admin actions.
    Superadmin,
}

impl UserRole {
    /// Returns the stable transport value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Returns whether the role may use the admin surface.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(AppError::Validation(format!(
                "unknown user role '{value}'"
            ))),
        }
    }
}

/// Caller identity resolved from request credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: String,
    email: Option<String>,
    role: UserRole,
}

impl UserIdentity {
    /// Creates a user identity from verified credential data.
    #[must_use]
    pub fn new(user_id: impl Into<String>, email: Option<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            email,
            role,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the email, if the credentials carried one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the caller's role.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::UserRole;

    #[test]
    fn role_round_trips_through_transport_value() {
        for role in [UserRole::User, UserRole::Admin, UserRole::Superadmin] {
            assert_eq!(UserRole::from_str(role.as_str()).ok(), Some(role));
        }
    }

    #[test]
    fn only_operator_roles_are_admin() {
        assert!(!UserRole::User.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::Superadmin.is_admin());
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(UserRole::from_str("owner").is_err());
    }
}
