use bytes::Bytes;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;

use super::color_classifier::ColorClassifier;
use crate::detector::types::ClassificationResult;
use crate::error::DetectorError;

/// Async front for [`ColorClassifier`]. Each call runs on tokio's blocking
/// pool since decoding and counting are CPU-bound.
#[derive(Clone)]
pub struct ClassifyService {
    classifier: Arc<ColorClassifier>,
}

impl ClassifyService {
    pub fn new(classifier: ColorClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

impl Service<Bytes> for ClassifyService {
    type Response = ClassificationResult;
    type Error = DetectorError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image_bytes: Bytes) -> Self::Future {
        let classifier = self.classifier.clone();

        Box::pin(async move {
            let result = tokio::task::spawn_blocking(move || classifier.classify(&image_bytes))
                .await
                .map_err(|e| DetectorError::Worker(e.to_string()))??;
            Ok::<_, DetectorError>(result)
        })
    }
}
