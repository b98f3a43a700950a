//! CLI configuration

use anyhow::Result;
use serde::Deserialize;

/// Optimizer configuration, loaded from `KRO_*` environment variables with
/// command-line flags layered on top.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    /// Metrics backend base URL
    #[serde(default = "default_prometheus_url")]
    pub prometheus_url: String,

    /// Historical window to analyze, in hours
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: f64,

    /// Per-query timeout in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Overall pipeline deadline in seconds
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
}

fn default_prometheus_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_lookback_hours() -> f64 {
    168.0
}

fn default_query_timeout() -> u64 {
    10
}

fn default_deadline() -> u64 {
    120
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            prometheus_url: default_prometheus_url(),
            lookback_hours: default_lookback_hours(),
            query_timeout_secs: default_query_timeout(),
            deadline_secs: default_deadline(),
        }
    }
}

impl OptimizerConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("KRO"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_one_week() {
        let config = OptimizerConfig::default();
        assert_eq!(config.lookback_hours, 168.0);
        assert_eq!(config.query_timeout_secs, 10);
    }
}
