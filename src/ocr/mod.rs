//! OCR subsystem: engine integration, preprocessing, and result types.

mod adapter;
mod engine;
mod types;

pub use adapter::OcrAdapter;
pub use engine::{OcrsDetector, TextDetector};
pub use types::{OcrError, RawDetection, TextBox};
