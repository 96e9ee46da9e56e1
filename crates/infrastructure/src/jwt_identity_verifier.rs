use std::str::FromStr;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use taskdeck_application::IdentityVerifier;
use taskdeck_core::{AppError, AppResult, UserIdentity, UserRole};

/// Minimum accepted length of the shared signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String {
    UserRole::User.as_str().to_owned()
}

/// Verifies HS256 access tokens issued by the auth service.
pub struct JwtIdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// Creates a verifier for tokens signed with `secret`.
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::Validation(format!(
                "JWT secret must be at least {MIN_JWT_SECRET_LEN} characters"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, credentials: &str) -> AppResult<Option<UserIdentity>> {
        let token_data = match decode::<AccessClaims>(credentials, &self.decoding_key, &self.validation)
        {
            Ok(token_data) => token_data,
            Err(error) if matches!(error.kind(), ErrorKind::ExpiredSignature) => return Ok(None),
            Err(error) => {
                return Err(AppError::Unauthorized(format!(
                    "invalid access token: {error}"
                )));
            }
        };

        let claims = token_data.claims;
        let role = UserRole::from_str(claims.role.as_str())?;

        Ok(Some(UserIdentity::new(claims.sub, claims.email, role)))
    }
}
