pub mod services;
pub mod types;

pub use services::{ClassifyService, ColorClassifier};
pub use types::{ClassificationResult, ColorWindow, Hsv, Palette, WindowTable, UNKNOWN_LABEL};
