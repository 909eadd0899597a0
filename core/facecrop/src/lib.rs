//! Face cropping: find a frontal face in a photo and save a margin-padded
//! crop around it.
//!
//! Detection is delegated to a [`FaceLocator`]. The built-in
//! [`RustfaceLocator`] (feature `rustface`, on by default) wraps the SeetaFace
//! frontal cascade; tests and other engines can plug in their own.
//!
//! # Example
//!
//! ```no_run
//! use facecrop::{DetectorSettings, FaceCropper, RustfaceLocator};
//!
//! let locator = RustfaceLocator::from_path(
//!     "model/seeta_fd_frontal_v1.0.bin",
//!     DetectorSettings::default(),
//! )
//! .unwrap();
//! let name = FaceCropper::new(&locator)
//!     .margin(0.3)
//!     .crop_file("photo.jpg", "face.jpg")
//!     .unwrap();
//! println!("saved {name}");
//! ```
#![warn(missing_docs)]

mod crop;
mod error;
/// Face detection trait and bounding-box type.
pub mod face_locator;
mod pipeline;
#[cfg(feature = "rustface")]
/// SeetaFace-based face locator backend.
pub mod rustface_backend;

use std::path::Path;

use image::DynamicImage;

/// Margin-padded crop computation.
pub use crop::{compute_crop, CropRect, DEFAULT_MARGIN_RATIO};
/// Error type returned by facecrop operations.
pub use error::FaceCropError;
/// Face detection trait and face bounding-box type.
pub use face_locator::{BoundingBox, FaceLocator};
#[cfg(feature = "rustface")]
/// Built-in locator that loads a SeetaFace model file.
pub use rustface_backend::{DetectorSettings, RustfaceLocator};

/// A face cut out of a decoded image.
#[derive(Debug, Clone)]
pub struct CroppedFace {
    /// The cropped pixels, in the source image's color type.
    pub image: DynamicImage,

    /// The detected face the crop was built around.
    pub face: BoundingBox,

    /// The crop rectangle in source image coordinates.
    pub crop: CropRect,
}

/// Builder for cropping faces out of photos.
///
/// Holds a borrowed locator so one expensive-to-load model can serve many
/// crops.
pub struct FaceCropper<'a> {
    locator: &'a dyn FaceLocator,
    /// Extra border around the face as a fraction of its width/height.
    margin_ratio: f64,
}

impl<'a> FaceCropper<'a> {
    /// Create a cropper using `locator` and the default margin of 0.3.
    pub fn new(locator: &'a dyn FaceLocator) -> Self {
        Self {
            locator,
            margin_ratio: DEFAULT_MARGIN_RATIO,
        }
    }

    /// Set the margin ratio (default: 0.3).
    ///
    /// The crop grows by `floor(face_width × ratio)` on the left and right and
    /// `floor(face_height × ratio)` on the top and bottom, clamped to the
    /// image. Must be finite and non-negative.
    pub fn margin(mut self, margin_ratio: f64) -> Self {
        self.margin_ratio = margin_ratio;
        self
    }

    /// Crop the first detected face out of an already-decoded image.
    pub fn crop_image(&self, image: &DynamicImage) -> Result<CroppedFace, FaceCropError> {
        pipeline::crop_first_face(image, self.margin_ratio, self.locator)
    }

    /// Decode `input_path`, crop the first detected face and write it to
    /// `output_path` in the format named by its extension.
    ///
    /// Returns the output file's base name. On error no file is written.
    pub fn crop_file(
        &self,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<String, FaceCropError> {
        pipeline::crop_file_pipeline(
            input_path.as_ref(),
            output_path.as_ref(),
            self.margin_ratio,
            self.locator,
        )
    }
}

impl std::fmt::Debug for FaceCropper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceCropper")
            .field("margin_ratio", &self.margin_ratio)
            .finish_non_exhaustive()
    }
}

/// Crop the first face found in `input_path` and save it to `output_path`.
///
/// Shorthand for `FaceCropper::new(locator).margin(margin_ratio).crop_file(..)`.
pub fn crop_face(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    margin_ratio: f64,
    locator: &dyn FaceLocator,
) -> Result<String, FaceCropError> {
    FaceCropper::new(locator)
        .margin(margin_ratio)
        .crop_file(input_path, output_path)
}

/// Crop the first face found in an already-decoded image.
pub fn crop_image(
    image: &DynamicImage,
    margin_ratio: f64,
    locator: &dyn FaceLocator,
) -> Result<CroppedFace, FaceCropError> {
    pipeline::crop_first_face(image, margin_ratio, locator)
}
