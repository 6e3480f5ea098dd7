use cookie::SameSite;

use crate::auth::cookies::parse_same_site;
use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Expired-session sweep period in seconds (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    /// JWT token configuration (secrets, expiry durations).
    pub jwt: JwtConfig,
    /// Refresh-token cookie attributes.
    pub cookies: CookieConfig,
}

/// Attributes of the refresh-token cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub refresh_cookie_name: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                    |
    /// |---------------------------------|----------------------------|
    /// | `HOST`                          | `0.0.0.0`                  |
    /// | `PORT`                          | `3000`                     |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                       |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                     |
    ///
    /// See [`JwtConfig::from_env`] and [`CookieConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_cleanup_interval_secs: u64 = std::env::var("SESSION_CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SESSION_CLEANUP_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session_cleanup_interval_secs,
            jwt: JwtConfig::from_env(),
            cookies: CookieConfig::from_env(),
        }
    }
}

impl CookieConfig {
    /// Load cookie attributes from environment variables.
    ///
    /// | Env Var               | Default                                    |
    /// |-----------------------|--------------------------------------------|
    /// | `REFRESH_COOKIE_NAME` | `refresh_token`                            |
    /// | `COOKIE_SECURE`       | `true` if `APP_ENV=production`, else `false` |
    /// | `COOKIE_SAMESITE`     | `lax`                                      |
    ///
    /// `SameSite=None` forces `Secure`, since browsers drop the cookie otherwise.
    pub fn from_env() -> Self {
        let refresh_cookie_name = env_string("REFRESH_COOKIE_NAME")
            .unwrap_or_else(|| "refresh_token".into());

        let production = env_string("APP_ENV").is_some_and(|v| v == "production");
        let mut secure = env_bool("COOKIE_SECURE").unwrap_or(production);

        let same_site = env_string("COOKIE_SAMESITE")
            .map(|v| parse_same_site(&v).expect("COOKIE_SAMESITE must be lax, strict or none"))
            .unwrap_or(SameSite::Lax);

        if same_site == SameSite::None && !secure {
            tracing::warn!("SameSite=None requires secure cookies; forcing COOKIE_SECURE=true");
            secure = true;
        }

        Self {
            refresh_cookie_name,
            secure,
            same_site,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(key: &str) -> Option<bool> {
    env_string(key).and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}
