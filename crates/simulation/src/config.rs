use std::env;
use tracing::warn;

/// Environment variable overriding the simulator base URL.
pub const SIMULATOR_URL_ENV: &str = "AVIATOR_SIMULATOR_URL";
/// Environment variable overriding the request timeout.
pub const SIMULATOR_TIMEOUT_ENV: &str = "AVIATOR_SIMULATOR_TIMEOUT_SECS";

/// Connection settings for the external simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Base URL; `/simulate` is appended.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SimulatorConfig {
    /// Reads overrides from the environment on top of the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var(SIMULATOR_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = env::var(SIMULATOR_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => warn!(value = %raw, "Ignoring invalid {}", SIMULATOR_TIMEOUT_ENV),
            }
        }
        config
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Full URL of the simulate endpoint.
    #[must_use]
    pub fn simulate_url(&self) -> String {
        format!("{}/simulate", self.base_url.trim_end_matches('/'))
    }
}
