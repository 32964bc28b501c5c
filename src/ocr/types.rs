//! OCR result types

use serde::Serialize;
use thiserror::Error;

/// Axis-aligned text box returned to clients.
///
/// Derived from the engine's 4-point quadrilateral by taking bounding
/// extents, which discards any rotation or skew the engine reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
}

impl TextBox {
    /// Bounding extents of a quadrilateral given in any point order.
    pub fn from_quad(quad: [[f32; 2]; 4], text: String) -> Self {
        let xs = quad.map(|p| p[0]);
        let ys = quad.map(|p| p[1]);
        let left = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let top = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let right = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let bottom = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        TextBox {
            left,
            top,
            width: right - left,
            height: bottom - top,
            text,
        }
    }
}

/// A single detection as reported by the engine, before filtering.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Corner points of the detected region, in no particular order.
    pub quad: [[f32; 2]; 4],
    pub text: String,
    /// Confidence in 0.0..=1.0.
    pub confidence: f32,
}

/// OCR error types
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to load OCR models: {0}")]
    ModelLoad(String),

    #[error("OCR engine error: {0}")]
    Engine(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_bounding_extents() {
        let quad = [[2.0, 5.0], [10.0, 5.0], [10.0, 20.0], [2.0, 20.0]];
        let text_box = TextBox::from_quad(quad, "hello".to_string());

        assert_eq!(text_box.left, 2.0);
        assert_eq!(text_box.top, 5.0);
        assert_eq!(text_box.width, 8.0);
        assert_eq!(text_box.height, 15.0);
        assert_eq!(text_box.text, "hello");
    }

    #[test]
    fn quad_order_is_irrelevant() {
        let shuffled = [[10.0, 20.0], [2.0, 5.0], [2.0, 20.0], [10.0, 5.0]];
        let text_box = TextBox::from_quad(shuffled, String::new());

        assert_eq!(
            (text_box.left, text_box.top, text_box.width, text_box.height),
            (2.0, 5.0, 8.0, 15.0)
        );
    }

    #[test]
    fn rotated_quad_collapses_to_axis_aligned_bounds() {
        // A diamond: rotation is discarded, only the extents survive.
        let quad = [[5.0, 0.0], [10.0, 5.0], [5.0, 10.0], [0.0, 5.0]];
        let text_box = TextBox::from_quad(quad, String::new());

        assert_eq!(
            (text_box.left, text_box.top, text_box.width, text_box.height),
            (0.0, 0.0, 10.0, 10.0)
        );
    }
}
