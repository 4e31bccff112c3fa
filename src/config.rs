//! Configuration management for the admin assistant.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `OPENROUTER_BASE_URL` - Optional. Chat-completion API base. Defaults to `https://openrouter.ai/api/v1`.
//! - `AUTH_SECRET` - Required outside dev mode. HMAC secret used to verify session tokens.
//! - `SESSION_COOKIE` - Optional. Name of the session cookie. Defaults to `authjs.session-token`.
//! - `SEARCH_URL` - Optional. HTML search endpoint. Defaults to DuckDuckGo's HTML frontend.
//! - `DATABASE_PATH` - Optional. SQLite file for canvases. In-memory storage when unset.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `DEV_MODE` - Optional. Enables a fixed development auth secret, which is
//!   only accepted when `HOST` is a loopback address.

use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Default OpenRouter API base.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default HTML search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// Default session cookie name (matches the dashboard's auth library).
pub const DEFAULT_SESSION_COOKIE: &str = "authjs.session-token";

/// Secret used when `DEV_MODE` is on and no `AUTH_SECRET` is given.
const DEV_AUTH_SECRET: &str = "admin-agent-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Session gate configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for verifying session JWTs.
    pub secret: String,

    /// Cookie carrying the session token.
    pub cookie_name: String,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Chat-completion API base URL
    pub openrouter_base_url: String,

    /// Search endpoint scraped by the `search` tool
    pub search_url: String,

    /// SQLite database for canvases (`None` keeps them in memory)
    pub database_path: Option<PathBuf>,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Development mode (fixed auth secret allowed)
    pub dev_mode: bool,

    /// Session gate configuration
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set,
    /// or if `AUTH_SECRET` is not set outside dev mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let openrouter_base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENROUTER_BASE_URL.to_string());

        let search_url =
            std::env::var("SEARCH_URL").unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string());

        let database_path = std::env::var("DATABASE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let dev_mode = std::env::var("DEV_MODE")
            .ok()
            .map(|v| {
                parse_bool(&v).map_err(|e| ConfigError::InvalidValue("DEV_MODE".to_string(), e))
            })
            .transpose()?
            // In debug builds, default to dev_mode=true; in release, default to false.
            .unwrap_or(cfg!(debug_assertions));

        let secret = match std::env::var("AUTH_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if dev_mode => {
                tracing::error!(
                    "AUTH_SECRET not set, using the public development secret; session tokens can be forged"
                );
                DEV_AUTH_SECRET.to_string()
            }
            _ => return Err(ConfigError::MissingEnvVar("AUTH_SECRET".to_string())),
        };

        let auth = AuthConfig {
            secret,
            cookie_name: std::env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE.to_string()),
        };

        let config = Self {
            api_key,
            openrouter_base_url,
            search_url,
            database_path,
            host,
            port,
            dev_mode,
            auth,
        };
        config.check_dev_secret()?;
        Ok(config)
    }

    /// Whether sessions are verified with the public development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.dev_mode && self.auth.secret == DEV_AUTH_SECRET
    }

    /// Refuse the development secret on any host other than loopback.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for `HOST` when the development
    /// secret is in use and the host is reachable from other machines.
    pub fn check_dev_secret(&self) -> Result<(), ConfigError> {
        if self.uses_dev_secret() && !is_loopback(&self.host) {
            return Err(ConfigError::InvalidValue(
                "HOST".to_string(),
                format!(
                    "{} is not a loopback address; set AUTH_SECRET to serve beyond localhost",
                    self.host
                ),
            ));
        }
        Ok(())
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, auth_secret: String) -> Self {
        Self {
            api_key,
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            database_path: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            dev_mode: true,
            auth: AuthConfig {
                secret: auth_secret,
                cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            },
        }
    }
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost")
        || host
            .trim_matches(|c| c == '[' || c == ']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool(" Yes "), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn new_config_uses_defaults() {
        let config = Config::new("key".to_string(), "secret".to_string());
        assert_eq!(config.openrouter_base_url, DEFAULT_OPENROUTER_BASE_URL);
        assert_eq!(config.auth.cookie_name, DEFAULT_SESSION_COOKIE);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn dev_secret_is_refused_off_loopback() {
        let mut config = Config::new("key".to_string(), DEV_AUTH_SECRET.to_string());
        assert!(config.uses_dev_secret());

        for host in ["127.0.0.1", "localhost", "::1", "[::1]"] {
            config.host = host.to_string();
            assert!(config.check_dev_secret().is_ok(), "{} should be allowed", host);
        }

        for host in ["0.0.0.0", "10.1.2.3", "admin.academy.test"] {
            config.host = host.to_string();
            assert!(matches!(
                config.check_dev_secret(),
                Err(ConfigError::InvalidValue(name, _)) if name == "HOST"
            ));
        }
    }

    #[test]
    fn real_secret_serves_any_host() {
        let mut config = Config::new("key".to_string(), "a-real-secret".to_string());
        config.host = "0.0.0.0".to_string();
        assert!(!config.uses_dev_secret());
        assert!(config.check_dev_secret().is_ok());
    }
}
