pub mod classification;
pub mod color_window;
pub mod hsv;

pub use classification::{ClassificationResult, UNKNOWN_LABEL};
pub use color_window::{ColorWindow, Palette, WindowTable, LEGACY_WINDOWS, STANDARD_WINDOWS};
pub use hsv::{Hsv, HUE_RANGE};
