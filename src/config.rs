use std::env;
use std::time::Duration;

/// Default backend address when `PROPERTY_API_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Runtime configuration, resolved once at startup and passed into the
/// HTTP client. Nothing reads the environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the property API, without a trailing slash
    pub api_base_url: String,
    /// Per-request timeout applied by the HTTP client
    pub request_timeout: Duration,
}

impl Config {
    /// Resolve configuration from the environment
    pub fn from_env() -> Self {
        let api_base_url = env::var("PROPERTY_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_overrides_default_base_url() {
        env::remove_var("PROPERTY_API_URL");
        assert_eq!(Config::from_env().api_base_url, DEFAULT_BASE_URL);

        env::set_var("PROPERTY_API_URL", "http://10.0.0.5:8080/api/");
        let config = Config::from_env();
        assert_eq!(config.api_base_url, "http://10.0.0.5:8080/api");
        env::remove_var("PROPERTY_API_URL");
    }
}
