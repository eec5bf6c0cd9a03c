//! Configuration module for the notes client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::AuthScheme;
use crate::notify::NotifyStyle;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the notes backend, without a trailing slash
    pub api_url: String,
    /// How the credential travels on authorized requests
    pub auth_scheme: AuthScheme,
    /// How notifications are presented to the user
    pub notify_style: NotifyStyle,
    /// Path to the durable credential store
    pub store_path: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long a banner notification stays visible
    pub banner_duration: Duration,
    /// Keep a token returned by registration and land on the notes page
    pub login_after_register: bool,
    /// Redirect signed-in users away from the login and registration pages
    pub skip_auth_pages_when_signed_in: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human readable text
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            auth_scheme: AuthScheme::Bearer,
            notify_style: NotifyStyle::Banner,
            store_path: PathBuf::from("./data/credentials.json"),
            request_timeout: Duration::from_secs(30),
            banner_duration: Duration::from_secs(3),
            login_after_register: false,
            skip_auth_pages_when_signed_in: true,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_url = env::var("NOTES_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let auth_scheme = parse_var("NOTES_AUTH_SCHEME", defaults.auth_scheme);
        let notify_style = parse_var("NOTES_NOTIFY_STYLE", defaults.notify_style);

        let store_path = env::var("NOTES_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let request_timeout = Duration::from_secs(parse_var(
            "NOTES_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        ));
        let banner_duration = Duration::from_secs(parse_var(
            "NOTES_BANNER_SECS",
            defaults.banner_duration.as_secs(),
        ));

        let login_after_register =
            parse_var("NOTES_LOGIN_AFTER_REGISTER", defaults.login_after_register);

        let log_level = env::var("NOTES_LOG_LEVEL").unwrap_or(defaults.log_level);
        let log_json = env::var("NOTES_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(defaults.log_json);

        Self {
            api_url,
            auth_scheme,
            notify_style,
            store_path,
            request_timeout,
            banner_duration,
            login_after_register,
            skip_auth_pages_when_signed_in: defaults.skip_auth_pages_when_signed_in,
            log_level,
            log_json,
        }
    }

    /// Absolute URL for an API path such as `/notes`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

/// Read and parse an environment variable, keeping the default on absence or bad input.
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value {:?} for {}", raw, key);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("NOTES_API_URL");
        env::remove_var("NOTES_AUTH_SCHEME");
        env::remove_var("NOTES_NOTIFY_STYLE");
        env::remove_var("NOTES_STORE_PATH");
        env::remove_var("NOTES_REQUEST_TIMEOUT_SECS");
        env::remove_var("NOTES_BANNER_SECS");
        env::remove_var("NOTES_LOGIN_AFTER_REGISTER");
        env::remove_var("NOTES_LOG_LEVEL");
        env::remove_var("NOTES_LOG_FORMAT");

        let config = Config::from_env();

        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.notify_style, NotifyStyle::Banner);
        assert_eq!(config.store_path, PathBuf::from("./data/credentials.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.banner_duration, Duration::from_secs(3));
        assert!(!config.login_after_register);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("NOTES_TEST_PARSE_GARBAGE", "not-a-number");
        assert_eq!(parse_var("NOTES_TEST_PARSE_GARBAGE", 7u64), 7);
        env::remove_var("NOTES_TEST_PARSE_GARBAGE");
    }

    #[test]
    fn test_parse_var_reads_scheme() {
        env::set_var("NOTES_TEST_PARSE_SCHEME", "credentials");
        assert_eq!(
            parse_var("NOTES_TEST_PARSE_SCHEME", AuthScheme::Bearer),
            AuthScheme::CredentialPair
        );
        env::remove_var("NOTES_TEST_PARSE_SCHEME");
    }

    #[test]
    fn test_endpoint_joins_path() {
        let config = Config {
            api_url: "http://notes.local".to_string(),
            ..Config::default()
        };
        assert_eq!(config.endpoint("/notes/3"), "http://notes.local/notes/3");
    }
}
