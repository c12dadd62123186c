//! API configuration

use serde::Deserialize;

use core_kernel::CoreError;
use domain_settlement::CalculatorConfig;

/// Prefix for environment variables, e.g. `PAYLY_PORT`
pub const ENV_PREFIX: &str = "PAYLY";

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Largest expense list accepted in a single request
    pub max_expenses: usize,
    /// Default calculator settings, overridable per request
    pub settlement: CalculatorConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            max_expenses: 10_000,
            settlement: CalculatorConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    ///
    /// Nested keys use a double underscore, so
    /// `PAYLY_SETTLEMENT__SPLIT_POLICY=reject` sets `settlement.split_policy`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Checks values the environment can't express as type errors
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_expenses == 0 {
            return Err(CoreError::configuration("max_expenses must be at least 1"));
        }
        self.settlement
            .validate()
            .map_err(|err| CoreError::configuration(err.to_string()))
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
