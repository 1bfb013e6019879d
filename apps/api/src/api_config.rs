use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ecclesia_core::AppError;
use tracing_subscriber::EnvFilter;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub auth_bridge_token: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub bootstrap_super_admin_subject: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let auth_bridge_token = required_non_empty_env("AUTH_BRIDGE_TOKEN")?;
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "SESSION_SECRET must be at least {MIN_SESSION_SECRET_LENGTH} characters"
            )));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let bootstrap_super_admin_subject = env::var("BOOTSTRAP_SUPER_ADMIN_SUBJECT")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            auth_bridge_token,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            bootstrap_super_admin_subject,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
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

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
