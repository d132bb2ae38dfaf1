use axum::http::HeaderValue;
use serde::Deserialize;
use std::{path::Path, str::FromStr};
use tracing::Level;

use crate::detector::services::{
    DEFAULT_MAX_INPUT_BYTES, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH,
};
use crate::detector::types::Palette;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "COLOR_DETECTOR";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub log_level: String,
    pub server: ServerConfig,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub max_concurrent_requests: usize,
    /// Browser origins allowed to call the API. Empty disables CORS, `*` allows any.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub target_width: u32,
    pub target_height: u32,
    pub palette: Palette,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_concurrent_requests: 16,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            palette: Palette::Standard,
        }
    }
}

impl Configuration {
    /// Loads `path` if it exists, then applies `COLOR_DETECTOR_*` overrides,
    /// e.g. `COLOR_DETECTOR_SERVER__PORT=9000`. Origins in
    /// `COLOR_DETECTOR_SERVER__CORS_ALLOWED_ORIGINS` are comma separated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(Self::environment())
            .build()?;
        Self::finish(settings)
    }

    /// Parses a TOML document without consulting the environment.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(contents, ::config::FileFormat::Toml))
            .build()?;
        Self::finish(settings)
    }

    fn environment() -> ::config::Environment {
        ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("server.cors_allowed_origins")
    }

    fn finish(settings: ::config::Config) -> Result<Self, ConfigError> {
        let configuration: Configuration = settings.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Level::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "Unknown log level '{}'",
                self.log_level
            )));
        }

        if self.detector.target_width == 0 || self.detector.target_height == 0 {
            return Err(ConfigError::Invalid(
                "Target resolution must be greater than 0".to_string(),
            ));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "Max upload size must be greater than 0".to_string(),
            ));
        }

        if self.server.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "Max concurrent requests must be greater than 0".to_string(),
            ));
        }

        if let Some(origin) = self
            .server
            .cors_allowed_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            return Err(ConfigError::Invalid(format!(
                "Invalid CORS origin '{}'",
                origin
            )));
        }

        Ok(())
    }

    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    // Overrides the listening port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    // Overrides the classifier's resize target.
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.detector.target_width = width;
        self.detector.target_height = height;
        self
    }

    // Selects which fixed window table to evaluate.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.detector.palette = palette;
        self
    }

    // Enables CORS for the given browser origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.server.cors_allowed_origins = origins;
        self
    }

    // Caps the image bytes handed to the decoder. The request body may also
    // carry multipart framing on top of this.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.server.max_upload_bytes = max_upload_bytes;
        self
    }
}
