use anyhow::Error;
use confique::Config;
use std::{
    net::IpAddr,
    sync::{Arc, OnceLock},
};

#[derive(Debug, Config)]
pub struct GraphwatchConfig {
    #[config(env = "GRAPHWATCH_PORT", default = 7002)]
    pub port: u16,
    #[config(env = "GRAPHWATCH_ENDPOINT", default = "127.0.0.1")]
    pub endpoint: IpAddr,

    #[config(env = "GRAPHWATCH_HTTP_BODY_LIMIT", default = "1mb")]
    pub http_body_limit: String,

    #[config(env = "GRAPHWATCH_HTTP_SERVER_TIMEOUT_SECONDS", default = 30)]
    pub http_server_timeout_seconds: u64,

    /// Base URL of the Prometheus-compatible metrics backend.
    #[config(env = "GRAPHWATCH_PROMETHEUS_URL", default = "http://127.0.0.1:9090")]
    pub prometheus_url: String,

    #[config(env = "GRAPHWATCH_QUERY_TIMEOUT_SECONDS", default = 15)]
    pub query_timeout_seconds: u64,

    /// Value of the cluster label scoping every query. Unset means an
    /// unscoped single-cluster deployment.
    #[config(env = "GRAPHWATCH_CLUSTER_ID")]
    pub cluster_id: Option<String>,

    /// Lookback window for service status queries, in seconds.
    #[config(env = "GRAPHWATCH_STATUS_LOOKBACK_SECONDS", default = 60)]
    pub status_lookback_seconds: i64,

    #[config(env = "GRAPHWATCH_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

impl GraphwatchConfig {
    pub fn load() -> Result<GraphwatchConfig, Error> {
        Self::load_from("settings.toml")
    }

    pub fn load_from(path: &str) -> Result<GraphwatchConfig, Error> {
        let c = GraphwatchConfig::builder().env().file(path).load()?;

        Ok(c)
    }

    pub fn parse_http_body_limit(&self) -> Result<usize, Error> {
        let size = byte_unit::Byte::parse_str(self.http_body_limit.clone(), true)?.as_u64();
        if size > 128 * 1024 * 1024 {
            anyhow::bail!("Body size is too big: > 128MB");
        }
        Ok(size as usize)
    }

    pub fn parse_prometheus_url(&self) -> Result<url::Url, Error> {
        Ok(url::Url::parse(&self.prometheus_url)?)
    }
}

static GRAPHWATCH_CONFIG: OnceLock<Arc<GraphwatchConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<GraphwatchConfig>, Error> {
    GRAPHWATCH_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    // Check if the configuration has already been loaded
    if GRAPHWATCH_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = GraphwatchConfig::load()?;
    GRAPHWATCH_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

pub fn load_configuration_from(path: &str) -> Result<(), Error> {
    if GRAPHWATCH_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = GraphwatchConfig::load_from(path)?;
    GRAPHWATCH_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

use std::sync::Mutex;

// Used by integration tests - must be always available for test compilation
#[allow(dead_code)] // Used by integration tests, not visible in cargo check
static TEST_CONFIG_INIT: Mutex<()> = Mutex::new(());

/// Test-only function to ensure configuration is loaded exactly once per test run
#[allow(dead_code)] // Used by integration tests, not visible in cargo check
pub fn load_configuration_for_tests() -> Result<(), Error> {
    let _guard = TEST_CONFIG_INIT.lock().unwrap();

    if GRAPHWATCH_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = GraphwatchConfig::load()?;
    GRAPHWATCH_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_config() {
        let config = GraphwatchConfig::load().unwrap();

        assert_eq!(config.port, 7002);
        assert_eq!(config.endpoint, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.prometheus_url, "http://127.0.0.1:9090");
        assert!(config.cluster_id.is_none());

        temp_env::with_var("GRAPHWATCH_PORT", Some("8080"), || {
            let config = GraphwatchConfig::load().unwrap();
            assert_eq!(config.port, 8080);
        });

        temp_env::with_var("GRAPHWATCH_CLUSTER_ID", Some("7"), || {
            let config = GraphwatchConfig::load().unwrap();
            assert_eq!(config.cluster_id.as_deref(), Some("7"));
        });
    }

    #[test]
    #[serial]
    fn test_parse_http_body_limit() {
        let config = GraphwatchConfig::load().unwrap();
        assert_eq!(config.parse_http_body_limit().unwrap(), 1000000);

        temp_env::with_var("GRAPHWATCH_HTTP_BODY_LIMIT", Some("12345"), || {
            let config = GraphwatchConfig::load().unwrap();
            assert_eq!(config.parse_http_body_limit().unwrap(), 12345);
        });

        temp_env::with_var("GRAPHWATCH_HTTP_BODY_LIMIT", Some("10MiB"), || {
            let config = GraphwatchConfig::load().unwrap();
            assert_eq!(config.parse_http_body_limit().unwrap(), 10485760);
        });

        temp_env::with_var("GRAPHWATCH_HTTP_BODY_LIMIT", Some("1gb"), || {
            let config = GraphwatchConfig::load().unwrap();
            assert!(config.parse_http_body_limit().is_err());
        });
    }

    #[test]
    #[serial]
    fn test_parse_prometheus_url() {
        temp_env::with_var("GRAPHWATCH_PROMETHEUS_URL", Some("http://prom:9090/sub"), || {
            let config = GraphwatchConfig::load().unwrap();
            let url = config.parse_prometheus_url().unwrap();
            assert_eq!(url.host_str(), Some("prom"));
            assert_eq!(url.path(), "/sub");
        });

        temp_env::with_var("GRAPHWATCH_PROMETHEUS_URL", Some("not a url"), || {
            let config = GraphwatchConfig::load().unwrap();
            assert!(config.parse_prometheus_url().is_err());
        });
    }
}
