use color_detector::config::{Configuration, DEFAULT_CONFIG_PATH};
use color_detector::{AppError, Server};
use tracing::Level;

const CONFIG_PATH_VAR: &str = "COLOR_DETECTOR_CONFIG";

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config_path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let configuration = Configuration::load(&config_path)?;
    init_logging(configuration.log_level());
    tracing::info!("Loaded configuration from {}", config_path);

    Server::new(configuration).start().await
}
