pub mod config;
pub mod detector;
pub mod error;
pub mod network;

pub use config::Configuration;
pub use detector::{ClassificationResult, ColorClassifier, Palette};
pub use error::{ApiError, AppError, ConfigError, DecodeError, DetectorError};

pub use network::Server;
