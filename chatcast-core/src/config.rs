use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// Directory with the built viewer client; served as a fallback when set.
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 3000,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// WebSocket endpoint of the provider-connector sidecar that owns the
    /// actual live-stream protocol and emits decoded JSON events.
    pub connector_url: String,
    /// Request extended gift metadata from the provider.
    pub enable_extended_gift_info: bool,
    pub connect_timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connector_url: "ws://127.0.0.1:8090/events".to_string(),
            enable_extended_gift_info: true,
            connect_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = file {
            builder = builder.add_source(File::with_name(path));
        }

        // Override with environment variables (CHATCAST_SERVER_HOST, etc.)
        builder = builder.add_source(
            Environment::with_prefix("CHATCAST")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Validate configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.http_port == 0 {
            errors.push("server.http_port must be non-zero".to_string());
        }

        match Url::parse(&self.upstream.connector_url) {
            Ok(url) if url.scheme() == "ws" || url.scheme() == "wss" => {}
            Ok(url) => errors.push(format!(
                "upstream.connector_url must use ws:// or wss://, got {}://",
                url.scheme()
            )),
            Err(e) => errors.push(format!("upstream.connector_url is not a valid URL: {e}")),
        }

        if self.upstream.connect_timeout_seconds == 0 {
            errors.push("upstream.connect_timeout_seconds must be non-zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get HTTP address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

/// Load configuration from config file or environment variables
///
/// Config file search order:
/// 1. `CHATCAST_CONFIG_PATH` environment variable (explicit path)
/// 2. ./config.yaml (current working directory)
/// 3. Fall back to environment variables only
pub fn load_config() -> anyhow::Result<Config> {
    let config_path = std::env::var("CHATCAST_CONFIG_PATH")
        .ok()
        .filter(|p| std::path::Path::new(p).exists())
        .or_else(|| {
            let cwd = "config.yaml";
            std::path::Path::new(cwd)
                .exists()
                .then(|| cwd.to_string())
        });

    let config = if let Some(path) = config_path {
        eprintln!("Loading config from {path}");
        match Config::from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                eprintln!("Falling back to environment variables");
                Config::from_env().unwrap_or_default()
            }
        }
    } else {
        Config::from_env().unwrap_or_else(|e| {
            eprintln!("Failed to load config from environment: {e}");
            eprintln!("Using default configuration");
            Config::default()
        })
    };

    // Fail fast on misconfigurations
    if let Err(errors) = config.validate() {
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    Ok(config)
}
