use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::FaceCropError;
use crate::face_locator::{BoundingBox, FaceLocator};

/// Sliding-window parameters for the SeetaFace detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    /// Smallest face edge, in pixels, the detector will report.
    pub min_face_size: u32,
    /// Minimum classifier score for a window to count as a face.
    pub score_threshold: f64,
    /// Scale step between image pyramid levels (0.0–1.0).
    pub pyramid_scale_factor: f32,
    /// Horizontal and vertical window step, in pixels.
    pub slide_window_step: (u32, u32),
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_face_size: 20,
            score_threshold: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: (4, 4),
        }
    }
}

/// Face locator backed by the `rustface` crate (SeetaFace funnel cascade).
///
/// The model is parsed once on construction; every [`FaceLocator::detect`]
/// call runs a fresh detector over a clone of it, so a single instance can be
/// shared between threads.
pub struct RustfaceLocator {
    model: rustface::Model,
    settings: DetectorSettings,
}

impl RustfaceLocator {
    /// Load a SeetaFace model file (e.g. `seeta_fd_frontal_v1.0.bin`).
    pub fn from_path(
        path: impl AsRef<Path>,
        settings: DetectorSettings,
    ) -> Result<Self, FaceCropError> {
        let path = path.as_ref();
        let model_load = |reason: String| FaceCropError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| model_load(e.to_string()))?;
        let model =
            rustface::read_model(BufReader::new(file)).map_err(|e| model_load(e.to_string()))?;
        tracing::debug!(model = %path.display(), "loaded SeetaFace model");
        Ok(Self { model, settings })
    }

    /// Load a model from an already-open reader.
    pub fn from_reader(
        reader: impl Read,
        settings: DetectorSettings,
    ) -> Result<Self, FaceCropError> {
        let model = rustface::read_model(reader).map_err(|e| FaceCropError::ModelLoad {
            path: "<reader>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self { model, settings })
    }

    /// The detector parameters in use.
    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }
}

impl std::fmt::Debug for RustfaceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustfaceLocator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FaceLocator for RustfaceLocator {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<BoundingBox> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.settings.min_face_size);
        detector.set_score_thresh(self.settings.score_threshold);
        detector.set_pyramid_scale_factor(self.settings.pyramid_scale_factor);
        let (step_x, step_y) = self.settings.slide_window_step;
        detector.set_slide_window_step(step_x, step_y);

        let mut image = rustface::ImageData::new(gray, width, height);
        let faces = detector.detect(&mut image);

        faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                BoundingBox::clamped(
                    i64::from(bbox.x()),
                    i64::from(bbox.y()),
                    bbox.width(),
                    bbox.height(),
                    width,
                    height,
                )
            })
            .collect()
    }
}
