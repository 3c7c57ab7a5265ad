use crate::error::ThrottlerResult;
use envconfig::Envconfig;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Envconfig, Clone)]
pub struct Config {
    /// Server bind address
    #[envconfig(from = "BIND_ADDR", default = "127.0.0.1:3000")]
    pub bind_addr: SocketAddr,

    /// Default log level for this crate
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Period of the expired-identity cleanup in milliseconds
    #[envconfig(from = "CLEANUP_INTERVAL_MS", default = "60000")]
    pub cleanup_interval_ms: u64,

    /// Order limiter window in milliseconds
    #[envconfig(from = "ORDER_WINDOW_MS", default = "3600000")]
    pub order_window_ms: u64,

    /// Orders accepted per client within one window
    #[envconfig(from = "ORDER_MAX_EVENTS", default = "5")]
    pub order_max_events: u32,

    /// Request limiter window in milliseconds
    #[envconfig(from = "REQUEST_WINDOW_MS", default = "60000")]
    pub request_window_ms: u64,

    /// Requests accepted per client within one window
    #[envconfig(from = "REQUEST_MAX_EVENTS", default = "30")]
    pub request_max_events: u32,

    /// Retry-After reported when the request limiter denies
    #[envconfig(from = "REQUEST_RETRY_AFTER_SECS", default = "60")]
    pub request_retry_after_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> ThrottlerResult<Self> {
        Ok(Config::init_from_env()?)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    pub fn order_window(&self) -> Duration {
        Duration::from_millis(self.order_window_ms)
    }

    pub fn request_window(&self) -> Duration {
        Duration::from_millis(self.request_window_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: "info".to_string(),
            cleanup_interval_ms: 60_000,
            order_window_ms: 3_600_000,
            order_max_events: 5,
            request_window_ms: 60_000,
            request_max_events: 30,
            request_retry_after_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThrottlerError;
    use std::collections::HashMap;

    #[test]
    fn test_env_defaults_match_default() {
        let from_env = Config::init_from_hashmap(&HashMap::new()).unwrap();
        let default = Config::default();

        assert_eq!(from_env.bind_addr, default.bind_addr);
        assert_eq!(from_env.cleanup_interval_ms, default.cleanup_interval_ms);
        assert_eq!(from_env.order_window_ms, default.order_window_ms);
        assert_eq!(from_env.order_max_events, default.order_max_events);
        assert_eq!(from_env.request_window_ms, default.request_window_ms);
        assert_eq!(from_env.request_max_events, default.request_max_events);
        assert_eq!(from_env.request_retry_after_secs, default.request_retry_after_secs);
    }

    #[test]
    fn test_overrides_from_map() {
        let mut vars = HashMap::new();
        vars.insert("ORDER_MAX_EVENTS".to_string(), "2".to_string());
        vars.insert("BIND_ADDR".to_string(), "0.0.0.0:8080".to_string());

        let config = Config::init_from_hashmap(&vars).unwrap();
        assert_eq!(config.order_max_events, 2);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.order_window(), Duration::from_secs(3600));
    }

    #[test]
    fn test_unparsable_value_becomes_config_error() {
        let mut vars = HashMap::new();
        vars.insert("ORDER_MAX_EVENTS".to_string(), "five".to_string());

        let err: ThrottlerError = Config::init_from_hashmap(&vars).unwrap_err().into();
        assert!(matches!(err, ThrottlerError::Config(_)));
    }
}
