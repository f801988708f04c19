//! Environment-based configuration for the HTTP transport.
//!
//! Runtime configuration changes without rebuilds: every knob has a default
//! and an environment override.
//!
//! ## Environment Variables
//!
//! - `TOOLBRIDGE_BIND` - Listen address (default: 0.0.0.0)
//! - `TOOLBRIDGE_PORT` - Listen port (default: 5000)
//! - `TOOLBRIDGE_ENABLE_CORS` - Enable permissive CORS (default: true)
//! - `TOOLBRIDGE_HANDLER_TIMEOUT_SECS` - Bound on a single tool handler
//!   invocation in seconds (default: 30)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("invalid listen address '{addr}': {message}")]
    InvalidAddress { addr: String, message: String },
}

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Listen address.
    pub bind: String,
    /// Listen port.
    pub port: u16,
    /// Enable permissive CORS.
    pub enable_cors: bool,
    /// Bound on a single handler invocation.
    pub handler_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            handler_timeout_secs: 30,
        }
    }
}

impl HttpConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = get_env_string("TOOLBRIDGE_BIND") {
            config.bind = bind;
        }
        if let Some(port) = get_env_parsed::<u16>("TOOLBRIDGE_PORT")? {
            config.port = port;
        }
        if let Some(cors) = get_env_bool("TOOLBRIDGE_ENABLE_CORS")? {
            config.enable_cors = cors;
        }
        if let Some(timeout) = get_env_parsed::<u64>("TOOLBRIDGE_HANDLER_TIMEOUT_SECS")? {
            config.handler_timeout_secs = timeout;
        }

        Ok(config)
    }

    /// The socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidAddress {
                addr: format!("{}:{}", self.bind, self.port),
                message: e.to_string(),
            })
    }

    /// The handler timeout as a `Duration`.
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.handler_timeout_secs)
    }
}

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match get_env_string(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match get_env_string(key) {
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            other => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("expected a boolean, got '{other}'"),
            }),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_env(key: &str, value: &str) {
        unsafe {
            env::set_var(key, value);
        }
    }

    fn clear_env(key: &str) {
        unsafe {
            env::remove_var(key);
        }
    }

    fn clear_all() {
        for key in [
            "TOOLBRIDGE_BIND",
            "TOOLBRIDGE_PORT",
            "TOOLBRIDGE_ENABLE_CORS",
            "TOOLBRIDGE_HANDLER_TIMEOUT_SECS",
        ] {
            clear_env(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_when_no_vars_set() {
        clear_all();

        let config = HttpConfig::from_env().expect("should load defaults");
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert!(config.enable_cors);
        assert_eq!(config.handler_timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn env_overrides_are_applied() {
        clear_all();
        set_env("TOOLBRIDGE_BIND", "127.0.0.1");
        set_env("TOOLBRIDGE_PORT", "8080");
        set_env("TOOLBRIDGE_ENABLE_CORS", "false");
        set_env("TOOLBRIDGE_HANDLER_TIMEOUT_SECS", "5");

        let config = HttpConfig::from_env().expect("should load config");
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(!config.enable_cors);
        assert_eq!(config.handler_timeout(), Duration::from_secs(5));

        clear_all();
    }

    #[test]
    #[serial]
    fn invalid_port_is_an_error() {
        clear_all();
        set_env("TOOLBRIDGE_PORT", "not-a-port");

        let err = HttpConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));

        clear_all();
    }

    #[test]
    #[serial]
    fn invalid_bool_is_an_error() {
        clear_all();
        set_env("TOOLBRIDGE_ENABLE_CORS", "maybe");

        let err = HttpConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("TOOLBRIDGE_ENABLE_CORS"));

        clear_all();
    }

    #[test]
    fn socket_addr_parses_bind_and_port() {
        let config = HttpConfig {
            bind: "127.0.0.1".into(),
            port: 9000,
            ..HttpConfig::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");

        let bad = HttpConfig {
            bind: "not an address".into(),
            ..HttpConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }
}
