//! Server configuration module

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::{env_parse, env_string, ConfigError};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,

    /// Maximum JSON payload size in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    /// Peer addresses allowed to set `X-Forwarded-For` and `X-Real-IP`
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0, // Use all CPU cores
            keep_alive: default_keep_alive(),
            max_payload_size: default_max_payload_size(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_string("SERVER_HOST") {
            self.host = v;
        }
        if let Some(v) = env_parse("SERVER_PORT")? {
            self.port = v;
        }
        if let Some(v) = env_parse("SERVER_WORKERS")? {
            self.workers = v;
        }
        if let Some(v) = env_string("TRUSTED_PROXIES") {
            self.trusted_proxies = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(())
    }

    /// Trusted proxy addresses, parsed
    pub fn trusted_proxy_addrs(&self) -> Result<Vec<IpAddr>, ConfigError> {
        self.trusted_proxies
            .iter()
            .map(|proxy| {
                proxy.parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                    key: "TRUSTED_PROXIES".to_string(),
                    value: proxy.clone(),
                })
            })
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.trusted_proxy_addrs().map(|_| ())
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Explicitly allowed origins
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allow any origin (development only)
    #[serde(default)]
    pub allow_any_origin: bool,

    /// Preflight cache max age in seconds
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_any_origin: false,
            max_age: default_cors_max_age(),
        }
    }
}

impl CorsConfig {
    /// Permissive CORS for local development and Expo web builds
    pub fn development() -> Self {
        Self {
            allow_any_origin: true,
            ..Default::default()
        }
    }

    pub(crate) fn apply_env(&mut self) {
        if let Some(origins) = env_string("CORS_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

fn default_keep_alive() -> u64 {
    75
}

fn default_max_payload_size() -> usize {
    16 * 1024
}

fn default_cors_max_age() -> usize {
    3600
}
