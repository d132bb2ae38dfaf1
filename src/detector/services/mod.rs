pub mod classify_service;
pub mod color_classifier;
pub mod preprocessing;

pub use classify_service::ClassifyService;
pub use color_classifier::*;
