//! OCR adapter
//!
//! Bridges the blocking detection engine into the async gateway: decodes the
//! uploaded bytes, applies preprocessing, runs the engine on a blocking
//! worker, and normalizes detections into axis-aligned text boxes.

use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;

use crate::config::OcrConfig;

use super::engine::TextDetector;
use super::types::{OcrError, TextBox};

#[derive(Clone)]
pub struct OcrAdapter {
    detector: Arc<dyn TextDetector>,
    confidence_threshold: f32,
    grayscale: bool,
}

impl OcrAdapter {
    pub fn new(detector: Arc<dyn TextDetector>, config: &OcrConfig) -> Self {
        Self {
            detector,
            confidence_threshold: config.confidence_threshold,
            grayscale: config.grayscale,
        }
    }

    /// Decode an uploaded image and run text detection on it.
    ///
    /// The decode and the engine call both run on a blocking worker thread so
    /// the event loop stays responsive. Detections with confidence at or
    /// below the threshold are discarded; an engine that finds nothing yields
    /// an empty list, not an error.
    pub async fn detect(&self, image_bytes: Bytes) -> Result<Vec<TextBox>, OcrError> {
        let detector = self.detector.clone();
        let threshold = self.confidence_threshold;
        let grayscale = self.grayscale;

        tokio::task::spawn_blocking(move || {
            let image = image::load_from_memory(&image_bytes)
                .map_err(|e| OcrError::Decode(e.to_string()))?;
            let image = if grayscale {
                DynamicImage::ImageLuma8(image.to_luma8())
            } else {
                image
            };

            let detections = detector.detect(&image)?;
            Ok(detections
                .into_iter()
                .filter(|d| d.confidence > threshold)
                .map(|d| TextBox::from_quad(d.quad, d.text))
                .collect())
        })
        .await
        .map_err(|e| OcrError::Engine(format!("detection worker failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::RawDetection;
    use std::io::Cursor;

    struct FixedDetector {
        detections: Vec<RawDetection>,
    }

    impl TextDetector for FixedDetector {
        fn detect(&self, _image: &DynamicImage) -> Result<Vec<RawDetection>, OcrError> {
            Ok(self.detections.clone())
        }
    }

    struct FailingDetector;

    impl TextDetector for FailingDetector {
        fn detect(&self, _image: &DynamicImage) -> Result<Vec<RawDetection>, OcrError> {
            Err(OcrError::Engine("model exploded".to_string()))
        }
    }

    fn detection(text: &str, confidence: f32) -> RawDetection {
        RawDetection {
            quad: [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
            text: text.to_string(),
            confidence,
        }
    }

    fn png_bytes() -> Bytes {
        let image = DynamicImage::new_rgb8(4, 4);
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        Bytes::from(buffer)
    }

    fn adapter(detector: Arc<dyn TextDetector>) -> OcrAdapter {
        OcrAdapter::new(detector, &crate::config::Config::default().ocr)
    }

    #[tokio::test]
    async fn filters_detections_at_or_below_threshold() {
        let detector = Arc::new(FixedDetector {
            detections: vec![
                detection("a", 0.05),
                detection("b", 0.1),
                detection("c", 0.11),
                detection("d", 0.9),
            ],
        });

        let boxes = adapter(detector).detect(png_bytes()).await.unwrap();
        let texts: Vec<&str> = boxes.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "d"]);
    }

    #[tokio::test]
    async fn no_detections_is_an_empty_list() {
        let detector = Arc::new(FixedDetector { detections: vec![] });
        let boxes = adapter(detector).detect(png_bytes()).await.unwrap();
        assert!(boxes.is_empty());
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_decode_error() {
        let detector = Arc::new(FixedDetector { detections: vec![] });
        let result = adapter(detector)
            .detect(Bytes::from_static(b"not an image"))
            .await;
        assert!(matches!(result, Err(OcrError::Decode(_))));
    }

    #[tokio::test]
    async fn engine_failure_propagates() {
        let result = adapter(Arc::new(FailingDetector)).detect(png_bytes()).await;
        assert!(matches!(result, Err(OcrError::Engine(_))));
    }
}
