use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use taskdeck_core::AppError;
use taskdeck_domain::{
    DEFAULT_MAX_REQUESTS, DEFAULT_REQUEST_LOG_CAPACITY, DEFAULT_SYSTEM_LOG_CAPACITY,
    DEFAULT_WINDOW_MS, RateLimitConfig,
};
use taskdeck_infrastructure::MIN_JWT_SECRET_LEN;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub jwt_secret: String,
    pub request_log_capacity: usize,
    pub system_log_capacity: usize,
    pub default_rate_limit: RateLimitConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let jwt_secret = required_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters"
            )));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parse_env("API_PORT", 3001_u16)?;

        let request_log_capacity =
            parse_env("REQUEST_LOG_CAPACITY", DEFAULT_REQUEST_LOG_CAPACITY)?;
        let system_log_capacity = parse_env("SYSTEM_LOG_CAPACITY", DEFAULT_SYSTEM_LOG_CAPACITY)?;

        let default_rate_limit = RateLimitConfig::new(
            parse_env("RATE_LIMIT_DEFAULT_WINDOW_MS", DEFAULT_WINDOW_MS)?,
            parse_env("RATE_LIMIT_DEFAULT_MAX_REQUESTS", DEFAULT_MAX_REQUESTS)?,
        )?;

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            jwt_secret,
            request_log_capacity,
            system_log_capacity,
            default_rate_limit,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(self.api_host.as_str())
            .map_err(|error| AppError::Validation(format!("invalid API_HOST: {error}")))?;

        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_env;

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let value = parse_env("TASKDECK_TEST_UNSET_VARIABLE", 42_u32);
        assert_eq!(value.ok(), Some(42));
    }
}
