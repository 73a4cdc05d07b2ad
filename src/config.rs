use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:10000";
const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 5 * 60 * 1000;
const DEFAULT_INACTIVITY_WARNING_MS: u64 = 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: String,
    pub environment: String,
    pub enable_logging: bool,
    pub inactivity_timeout_ms: u64,
    pub inactivity_warning_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            inactivity_warning_ms: DEFAULT_INACTIVITY_WARNING_MS,
        }
    }
}

/// Timing of the inactivity monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityConfig {
    pub timeout: Duration,
    pub warning_lead: Duration,
}

impl InactivityConfig {
    pub fn new(timeout: Duration, warning_lead: Duration) -> Self {
        Self { timeout, warning_lead }
    }

    /// Delay of the warning timer, `None` when the lead does not fit in the timeout.
    pub fn warning_delay(&self) -> Option<Duration> {
        if self.timeout > self.warning_lead {
            Some(self.timeout - self.warning_lead)
        } else {
            None
        }
    }
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_INACTIVITY_TIMEOUT_MS),
            warning_lead: Duration::from_millis(DEFAULT_INACTIVITY_WARNING_MS),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from compile-time environment variables
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("API_URL"),
            option_env!("ENVIRONMENT"),
            option_env!("ENABLE_LOGGING"),
            option_env!("INACTIVITY_TIMEOUT_MS"),
            option_env!("INACTIVITY_WARNING_MS"),
        )
    }

    fn from_values(
        api_url: Option<&str>,
        environment: Option<&str>,
        enable_logging: Option<&str>,
        timeout_ms: Option<&str>,
        warning_ms: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            api_url: api_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_url),
            environment: environment
                .map(str::to_string)
                .unwrap_or(defaults.environment),
            enable_logging: enable_logging
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
            inactivity_timeout_ms: timeout_ms
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.inactivity_timeout_ms),
            inactivity_warning_ms: warning_ms
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.inactivity_warning_ms),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn inactivity(&self) -> InactivityConfig {
        InactivityConfig::new(
            Duration::from_millis(self.inactivity_timeout_ms),
            Duration::from_millis(self.inactivity_warning_ms),
        )
    }
}

// Process-wide configuration, resolved at compile time
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
