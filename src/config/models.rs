//! Configuration data structures for the relay.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files and to
//! `API_RELAY__*` environment variables. Every section carries defaults so an empty
//! file yields a working relay pointed at a local upstream.
use serde::{Deserialize, Serialize};

/// Default path prefix relayed to the upstream.
pub const DEFAULT_PREFIX: &str = "/api";

/// Default maximum inbound body size (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

fn default_excluded_headers() -> Vec<String> {
    ["host", "connection", "content-length"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Where and how requests are forwarded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream origin, scheme + host (+ port), e.g. `http://10.0.0.5:8000`
    pub origin: String,
    /// Path prefix stripped from inbound paths and re-attached upstream
    pub prefix: String,
    /// Inbound header names never copied to the upstream request (case-insensitive)
    pub excluded_headers: Vec<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8000".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            excluded_headers: default_excluded_headers(),
        }
    }
}

/// CORS headers stamped on every response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_credentials: bool,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_credentials: true,
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_headers: ["Content-Type", "Authorization", "Cookie"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence over `level` when set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// JSON lines when true, human readable output otherwise
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    pub listen_addr: String,
    pub max_body_bytes: usize,
    pub upstream: UpstreamConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Create a new relay configuration builder
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            upstream: UpstreamConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Builder for RelayConfig, mostly used when embedding the relay or in tests.
#[derive(Default)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the upstream origin
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.config.upstream.origin = origin.into();
        self
    }

    /// Set the relayed path prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.upstream.prefix = prefix.into();
        self
    }

    /// Add a header name to the exclusion set
    pub fn exclude_header(mut self, name: impl Into<String>) -> Self {
        self.config.upstream.excluded_headers.push(name.into());
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    pub fn cors(mut self, cors: CorsConfig) -> Self {
        self.config.cors = cors;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build the final RelayConfig
    pub fn build(self) -> RelayConfig {
        self.config
    }
}
