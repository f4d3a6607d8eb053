use std::env;
use std::fmt;
use std::io::IsTerminal;
use std::num::ParseIntError;
use std::time::Duration;

pub const LOCAL_API_URL: &str = "http://localhost:8000";
pub const PRODUCTION_API_URL: &str = "https://cumplimiento-tributario-production.up.railway.app";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let base_url = match env::var("APP_API_URL") {
            Ok(url) => ApiConfig::normalize_url(&url)?,
            Err(_) => ApiConfig::base_url_for_host(&host).to_string(),
        };

        let request_timeout = match env::var("APP_REQUEST_TIMEOUT_SECS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidTimeout { value, source })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let ansi = match env::var("APP_LOG_ANSI") {
            Ok(value) => parse_flag("APP_LOG_ANSI", value)?,
            Err(_) => TelemetryConfig::default_ansi(),
        };

        Ok(Self {
            environment,
            api: ApiConfig {
                host,
                base_url,
                request_timeout: Duration::from_secs(request_timeout),
            },
            telemetry: TelemetryConfig { log_level, ansi },
        })
    }
}

/// Where the compliance service lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host the client runs under; selects the local or hosted service.
    pub host: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn base_url_for_host(host: &str) -> &'static str {
        let host = host.trim().trim_start_matches('[').trim_end_matches(']');
        if host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1" || host == "::1" {
            LOCAL_API_URL
        } else {
            PRODUCTION_API_URL
        }
    }

    /// Re-targets the client at the service matching `host`.
    pub fn set_host(&mut self, host: String) {
        self.base_url = Self::base_url_for_host(&host).to_string();
        self.host = host;
    }

    pub fn set_base_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.base_url = Self::normalize_url(url)?;
        Ok(())
    }

    fn normalize_url(url: &str) -> Result<String, ConfigError> {
        let url = url.trim().trim_end_matches('/');
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url.to_string())
        } else {
            Err(ConfigError::InvalidApiUrl {
                value: url.to_string(),
            })
        }
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colour the log lines; they are written to stderr.
    pub ansi: bool,
}

impl TelemetryConfig {
    /// Colour only when stderr is a terminal and `NO_COLOR` is unset.
    pub fn default_ansi() -> bool {
        let no_color = env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        !no_color && std::io::stderr().is_terminal()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTimeout {
        value: String,
        source: ParseIntError,
    },
    InvalidApiUrl {
        value: String,
    },
    InvalidFlag {
        name: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTimeout { value, .. } => write!(
                f,
                "APP_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{value}'"
            ),
            ConfigError::InvalidApiUrl { value } => {
                write!(f, "API URL must start with http:// or https://, got '{value}'")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidTimeout { source, .. } => Some(source),
            ConfigError::InvalidApiUrl { .. } | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
