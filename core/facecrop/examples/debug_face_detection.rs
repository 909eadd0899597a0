//! Print every face the SeetaFace locator finds and the crop each would give.
//!
//! Usage:
//!   cargo run --example debug_face_detection -- photo1.jpg photo2.png
//!
//! The model path is read from `FACECROP_MODEL`
//! (default: `model/seeta_fd_frontal_v1.0.bin`).

use facecrop::{compute_crop, DetectorSettings, FaceLocator, RustfaceLocator, DEFAULT_MARGIN_RATIO};

fn main() {
    let model_path = std::env::var("FACECROP_MODEL")
        .unwrap_or_else(|_| "model/seeta_fd_frontal_v1.0.bin".to_string());
    let locator = RustfaceLocator::from_path(&model_path, DetectorSettings::default())
        .unwrap_or_else(|e| panic!("{e}"));

    for path in std::env::args().skip(1) {
        let image = match image::open(&path) {
            Ok(image) => image,
            Err(e) => {
                println!("=== {path}: cannot decode ({e}) ===");
                continue;
            }
        };
        let gray = image::imageops::grayscale(&image);
        let (width, height) = (gray.width(), gray.height());

        println!("=== {path} ({width}x{height}) ===");

        let faces = locator.detect(gray.as_raw(), width, height);
        if faces.is_empty() {
            println!("  NO FACES DETECTED");
            continue;
        }

        println!("  Found {} face(s):", faces.len());
        for (i, face) in faces.iter().enumerate() {
            let crop = compute_crop(face, width, height, DEFAULT_MARGIN_RATIO);
            println!(
                "    face {i}: bbox=({}, {}, {}x{}) → crop=({}, {})-({}, {})",
                face.x, face.y, face.width, face.height, crop.x1, crop.y1, crop.x2, crop.y2,
            );
        }
        println!();
    }
}
