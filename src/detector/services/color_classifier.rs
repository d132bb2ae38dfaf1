use image::RgbImage;
use indexmap::IndexMap;
use tracing::debug;

use super::preprocessing;
use crate::config::DetectorConfig;
use crate::detector::types::{ClassificationResult, Hsv, WindowTable};
use crate::error::DecodeError;

pub const DEFAULT_TARGET_WIDTH: u32 = 200;
pub const DEFAULT_TARGET_HEIGHT: u32 = 200;
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Picks the dominant palette color of an image by counting pixels that fall
/// inside each HSV window of a fixed table.
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    windows: WindowTable,
    target_width: u32,
    target_height: u32,
    max_input_bytes: usize,
}

impl ColorClassifier {
    pub fn new(windows: WindowTable) -> Self {
        Self {
            windows,
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }

    pub fn from_config(config: &DetectorConfig, max_input_bytes: usize) -> Self {
        Self::new(config.palette.table())
            .with_target_size(config.target_width, config.target_height)
            .with_input_limit(max_input_bytes)
    }

    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_input_limit(mut self, max_input_bytes: usize) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    pub fn windows(&self) -> &WindowTable {
        &self.windows
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Decode, downsample, and classify an encoded image.
    pub fn classify(&self, bytes: &[u8]) -> Result<ClassificationResult, DecodeError> {
        let image = preprocessing::decode(bytes, self.max_input_bytes)?;
        Ok(self.classify_image(&image))
    }

    /// Classify an already decoded grid. The grid is resized to the target
    /// resolution first, so the pixel count never depends on the source size.
    pub fn classify_image(&self, image: &RgbImage) -> ClassificationResult {
        let resized = preprocessing::downsample(image, self.target_width, self.target_height);
        let counts = self.count_matches(&resized);
        debug!("Window counts: {:?}", counts);
        ClassificationResult::from_counts(counts)
    }

    fn count_matches(&self, image: &RgbImage) -> IndexMap<String, u32> {
        let mut tally = vec![0u32; self.windows.len()];

        for px in image.pixels() {
            let hsv = Hsv::from(px);
            for (slot, window) in tally.iter_mut().zip(self.windows.iter()) {
                if window.contains(&hsv) {
                    *slot += 1;
                }
            }
        }

        self.windows
            .iter()
            .zip(tally)
            .map(|(window, count)| (window.name.to_string(), count))
            .collect()
    }
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new(WindowTable::default())
    }
}
