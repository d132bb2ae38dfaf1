use tower::{limit::ConcurrencyLimit, ServiceBuilder};

use crate::config::Configuration;
use crate::detector::{ClassifyService, ColorClassifier, WindowTable};

pub type SharedClassifier = ConcurrencyLimit<ClassifyService>;

#[derive(Clone)]
pub struct AppState {
    pub classifier: SharedClassifier,
    pub windows: WindowTable,
}

impl AppState {
    pub fn new(classifier: ColorClassifier, max_concurrent_requests: usize) -> Self {
        let windows = *classifier.windows();
        let classifier = ServiceBuilder::new()
            .concurrency_limit(max_concurrent_requests)
            .service(ClassifyService::new(classifier));
        Self {
            classifier,
            windows,
        }
    }

    pub fn from_config(configuration: &Configuration) -> Self {
        let classifier = ColorClassifier::from_config(
            &configuration.detector,
            configuration.server.max_upload_bytes,
        );
        Self::new(classifier, configuration.server.max_concurrent_requests)
    }
}
