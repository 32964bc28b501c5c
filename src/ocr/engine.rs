//! OCR engine integration
//!
//! Wraps the ocrs/rten text recognition stack behind the [`TextDetector`]
//! trait so the rest of the gateway only sees quadrilateral detections.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams, OcrInput, TextItem};

use super::types::{OcrError, RawDetection};

/// A text detection engine.
///
/// `detect` is a long, CPU-bound, blocking call; callers must run it off the
/// async scheduling path (see [`super::OcrAdapter`]).
pub trait TextDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, OcrError>;
}

/// ocrs-backed detector, loading rten models from disk at startup.
pub struct OcrsDetector {
    engine: OcrEngine,
}

impl OcrsDetector {
    /// Load detection and recognition models.
    ///
    /// When `models_dir` is unset, well-known locations are probed:
    /// `<exe dir>/models/ocrs`, `<exe dir>/../share/ocrs`, `~/.cache/ocrs`.
    pub fn load(models_dir: Option<&Path>) -> Result<Self, OcrError> {
        let models_dir = match models_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::find_models_dir()?,
        };
        tracing::info!("Loading OCR models from {}", models_dir.display());

        let detection_model = rten::Model::load_file(models_dir.join("text-detection.rten"))
            .map_err(|e| OcrError::ModelLoad(e.to_string()))?;
        let recognition_model = rten::Model::load_file(models_dir.join("text-recognition.rten"))
            .map_err(|e| OcrError::ModelLoad(e.to_string()))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| OcrError::ModelLoad(e.to_string()))?;

        Ok(Self { engine })
    }

    fn find_models_dir() -> Result<PathBuf, OcrError> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        [
            exe_dir.clone().map(|p| p.join("models").join("ocrs")),
            exe_dir.and_then(|p| p.parent().map(|p| p.join("share").join("ocrs"))),
            dirs::home_dir().map(|p| p.join(".cache").join("ocrs")),
        ]
        .into_iter()
        .flatten()
        .find(|p| p.exists())
        .ok_or_else(|| OcrError::ModelLoad("could not find a models directory".to_string()))
    }
}

impl TextDetector for OcrsDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, OcrError> {
        let rgb_image = image.to_rgb8();
        let source = ImageSource::from_bytes(rgb_image.as_raw(), rgb_image.dimensions())
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        let input: OcrInput = self
            .engine
            .prepare_input(source)
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        let mut detections = Vec::new();
        for line in lines.into_iter().flatten() {
            let text: String = line.chars().iter().map(|c| c.char).collect();
            if text.trim().is_empty() {
                continue;
            }
            let corners = line.rotated_rect().corners();
            let quad = corners.map(|p| [p.x, p.y]);
            // ocrs does not report per-line confidence; recognized lines are
            // treated as fully confident and pass the threshold filter.
            detections.push(RawDetection {
                quad,
                text,
                confidence: 1.0,
            });
        }

        Ok(detections)
    }
}
