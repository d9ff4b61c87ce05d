use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PAYMENT_URL: &str = "https://pay.kirvano.com/e4c41901-7afa-47a8-a3ea-160341cc2d01";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub funnel: FunnelSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Full base URL; when unset the backend is assumed on localhost
    pub url: Option<String>,
    /// Port the backend itself listens on
    pub port: u16,
    pub timeout_secs: u64,
}

impl BackendSettings {
    pub fn base_url(&self) -> String {
        resolve_backend_url(self.url.as_deref(), self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunnelSettings {
    pub payment_url: String,
    pub service_name: String,
    /// Public origin of the site, used to build share links
    pub public_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

fn resolve_backend_url(url: Option<&str>, port: u16) -> String {
    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => format!("http://localhost:{}", port),
    }
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("backend.port", 8000)?
        .set_default("backend.timeout_secs", 30)?
        .set_default("funnel.payment_url", DEFAULT_PAYMENT_URL)?
        .set_default("funnel.service_name", "alma-gemea-frontend")?
        .set_default("logging.level", default_log_level())?
        .set_default("logging.format", default_log_format())
}

fn env_source() -> Environment {
    Environment::with_prefix("ALMA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ALMA__)
    /// 5. Plain process variables: PORT, BACKEND_URL/FLASK_URL, BACKEND_PORT/FLASK_PORT
    pub fn load() -> Result<Self, ConfigError> {
        let settings = with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env_source())
            .build()?;

        apply_process_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults()?
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        apply_process_env(settings)?.try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        with_defaults()?.build()?.try_deserialize()
    }
}

/// Apply the unprefixed variables the deployment sets
fn apply_process_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let port = env::var("PORT").ok();
    let backend_url = env::var("BACKEND_URL")
        .or_else(|_| env::var("FLASK_URL"))
        .ok();
    let backend_port = env::var("BACKEND_PORT")
        .or_else(|_| env::var("FLASK_PORT"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(port) = port {
        let port: u16 = port
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid PORT {:?}: {}", port, e)))?;
        builder = builder.set_override("server.port", i64::from(port))?;
    }
    if let Some(url) = backend_url {
        builder = builder.set_override("backend.url", url)?;
    }
    if let Some(backend_port) = backend_port {
        let backend_port: u16 = backend_port
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid backend port {:?}: {}", backend_port, e)))?;
        builder = builder.set_override("backend.port", i64::from(backend_port))?;
    }

    builder.build()
}
