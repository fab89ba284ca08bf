use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use crate::types::{Config, UpstreamConfig};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:32672";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

/// Unset and blank variables are treated the same.
fn non_empty<E: EnvironmentProvider>(env: &E, key: &str) -> Option<String> {
    env.get_var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let health_url = non_empty(env, "ES_HEALTH_URL")
        .ok_or_else(|| anyhow!("ES_HEALTH_URL env var must be set"))?;
    if !(health_url.starts_with("http://") || health_url.starts_with("https://")) {
        return Err(anyhow!("ES_HEALTH_URL must be an http(s) URL, got {}", health_url));
    }

    let username = non_empty(env, "ES_USERNAME");
    let password = env.get_var("ES_PASSWORD").filter(|v| !v.is_empty());
    if username.is_none() && password.is_some() {
        return Err(anyhow!("ES_PASSWORD is set but ES_USERNAME is not"));
    }

    let timeout_secs: u64 = non_empty(env, "ES_TIMEOUT_SECS")
        .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
        .parse()
        .context("Invalid ES_TIMEOUT_SECS")?;
    if timeout_secs == 0 {
        return Err(anyhow!("ES_TIMEOUT_SECS must be greater than zero"));
    }

    let listen_addr: SocketAddr = non_empty(env, "LISTEN_ADDR")
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
        .parse()
        .context("Invalid LISTEN_ADDR")?;

    Ok(Config {
        listen_addr,
        upstream: UpstreamConfig {
            health_url,
            username,
            password,
            timeout: Duration::from_secs(timeout_secs),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://10.3.12.1:9200/_cat/health";

    #[test]
    fn test_config_loading_with_env() {
        let env = MockEnvironment::new()
            .with_var("ES_HEALTH_URL", URL)
            .with_var("ES_USERNAME", "monitor")
            .with_var("ES_PASSWORD", "s3cret")
            .with_var("ES_TIMEOUT_SECS", "3")
            .with_var("LISTEN_ADDR", "127.0.0.1:9114");

        let config = load_config_with_env(&env).unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9114".parse().unwrap());
        assert_eq!(config.upstream.health_url, URL);
        assert_eq!(config.upstream.username.as_deref(), Some("monitor"));
        assert_eq!(config.upstream.password.as_deref(), Some("s3cret"));
        assert_eq!(config.upstream.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_config_loading_defaults() {
        let env = MockEnvironment::new().with_var("ES_HEALTH_URL", URL);

        let config = load_config_with_env(&env).unwrap();

        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(config.upstream.username, None);
        assert_eq!(config.upstream.password, None);
        assert_eq!(config.upstream.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_config_loading_missing_url() {
        let result = load_config_with_env(&MockEnvironment::new());
        assert!(result.unwrap_err().to_string().contains("ES_HEALTH_URL"));

        let env = MockEnvironment::new().with_var("ES_HEALTH_URL", "   ");
        assert!(load_config_with_env(&env).is_err());

        let env = MockEnvironment::new().with_var("ES_HEALTH_URL", "10.3.12.1:9200/_cat/health");
        assert!(load_config_with_env(&env).unwrap_err().to_string().contains("http"));
    }

    #[test]
    fn test_password_requires_username() {
        let env = MockEnvironment::new()
            .with_var("ES_HEALTH_URL", URL)
            .with_var("ES_PASSWORD", "s3cret");

        let err = load_config_with_env(&env).unwrap_err();
        assert!(err.to_string().contains("ES_USERNAME"));
    }

    #[test]
    fn test_invalid_numeric_and_addr() {
        for (key, val) in [
            ("ES_TIMEOUT_SECS", "soon"),
            ("ES_TIMEOUT_SECS", "0"),
            ("LISTEN_ADDR", "localhost"),
            ("LISTEN_ADDR", "0.0.0.0:99999"),
        ] {
            let env = MockEnvironment::new()
                .with_var("ES_HEALTH_URL", URL)
                .with_var(key, val);

            let err = load_config_with_env(&env).unwrap_err();
            assert!(err.to_string().contains(key), "{}={} gave {}", key, val, err);
        }
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let env = MockEnvironment::new()
            .with_var("ES_HEALTH_URL", URL)
            .with_var("ES_USERNAME", "monitor")
            .with_var("ES_PASSWORD", "s3cret");

        let config = load_config_with_env(&env).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
