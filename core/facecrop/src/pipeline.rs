use std::io::Cursor;
use std::path::Path;

use image::{ColorType, DynamicImage, ImageFormat, RgbImage};
use tracing::debug;

use crate::crop::compute_crop;
use crate::error::FaceCropError;
use crate::face_locator::FaceLocator;
use crate::CroppedFace;

/// Decode input bytes into a `DynamicImage`, sniffing the format from content.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, FaceCropError> {
    let image =
        image::load_from_memory(input).map_err(|e| FaceCropError::DecodeError(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(FaceCropError::ZeroDimensions);
    }
    Ok(image)
}

/// Read and decode the image at `path`. A missing file is a decode failure.
pub(crate) fn read_image(path: &Path) -> Result<DynamicImage, FaceCropError> {
    let bytes = std::fs::read(path)
        .map_err(|e| FaceCropError::DecodeError(format!("{}: {e}", path.display())))?;
    decode_image(&bytes)
}

pub(crate) fn validate_margin(margin_ratio: f64) -> Result<(), FaceCropError> {
    if !margin_ratio.is_finite() || margin_ratio < 0.0 {
        return Err(FaceCropError::InvalidMargin(margin_ratio));
    }
    Ok(())
}

/// Locate the first face in `image` and cut out the margin-padded region
/// around it.
pub(crate) fn crop_first_face(
    image: &DynamicImage,
    margin_ratio: f64,
    locator: &dyn FaceLocator,
) -> Result<CroppedFace, FaceCropError> {
    validate_margin(margin_ratio)?;

    let gray = image::imageops::grayscale(image);
    let (width, height) = (gray.width(), gray.height());

    let faces = locator.detect(gray.as_raw(), width, height);
    debug!(faces = faces.len(), width, height, "face detection finished");

    let face = *faces.first().ok_or(FaceCropError::NoFaceFound)?;
    let crop = compute_crop(&face, width, height, margin_ratio);
    if crop.is_empty() {
        return Err(FaceCropError::EmptyCrop);
    }
    debug!(?face, ?crop, margin_ratio, "computed crop");

    Ok(CroppedFace {
        image: image.crop_imm(crop.x1, crop.y1, crop.width(), crop.height()),
        face,
        crop,
    })
}

/// Drop the alpha channel by compositing every pixel over white.
pub(crate) fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        image::Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u32::from(channel), u32::from(alpha));
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Pick the output format from the file extension of `path`.
pub(crate) fn output_format(path: &Path) -> Result<ImageFormat, FaceCropError> {
    let format = ImageFormat::from_path(path)
        .map_err(|_| FaceCropError::UnsupportedFormat(path.to_path_buf()))?;
    if !format.writing_enabled() {
        return Err(FaceCropError::UnsupportedFormat(path.to_path_buf()));
    }
    Ok(format)
}

/// Whether the `format` encoder accepts `color` as is.
fn encoder_accepts(format: ImageFormat, color: ColorType) -> bool {
    match format {
        ImageFormat::Jpeg => matches!(color, ColorType::L8 | ColorType::Rgb8),
        ImageFormat::Png => !matches!(color, ColorType::Rgb32F | ColorType::Rgba32F),
        ImageFormat::Gif => matches!(color, ColorType::Rgb8 | ColorType::Rgba8),
        _ => matches!(
            color,
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
        ),
    }
}

/// Convert `image` to a pixel layout the `format` encoder can write, or
/// `None` when it already fits.
///
/// JPEG has no alpha channel, so transparent pixels are composited over
/// white. Other formats get 8-bit RGBA when the source has alpha and 8-bit
/// RGB otherwise; GIF always gets RGBA.
fn convert_for(image: &DynamicImage, format: ImageFormat) -> Option<DynamicImage> {
    let color = image.color();
    if encoder_accepts(format, color) {
        return None;
    }

    let converted = match format {
        ImageFormat::Jpeg if color.has_alpha() => DynamicImage::ImageRgb8(flatten_alpha(image)),
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        ImageFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ if color.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    };
    debug!(?color, to = ?converted.color(), ?format, "converted pixels for encoder");
    Some(converted)
}

/// Encode an image for `format`, converting its pixels first when the
/// encoder can't take them.
pub(crate) fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, FaceCropError> {
    let converted = convert_for(image, format);
    let image = converted.as_ref().unwrap_or(image);

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(|e| FaceCropError::EncodeError(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Full file pipeline: read → decode → detect → crop → encode → write.
///
/// Nothing is written unless every earlier step succeeded.
pub(crate) fn crop_file_pipeline(
    input_path: &Path,
    output_path: &Path,
    margin_ratio: f64,
    locator: &dyn FaceLocator,
) -> Result<String, FaceCropError> {
    validate_margin(margin_ratio)?;

    let decoded = read_image(input_path)?;
    let cropped = crop_first_face(&decoded, margin_ratio, locator)?;

    let format = output_format(output_path)?;
    let data = encode_image(&cropped.image, format)?;

    std::fs::write(output_path, &data).map_err(|source| FaceCropError::WriteError {
        path: output_path.to_path_buf(),
        source,
    })?;
    debug!(output = %output_path.display(), bytes = data.len(), "saved face crop");

    Ok(output_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_locator::BoundingBox;
    use image::{GrayImage, ImageBuffer, Luma, RgbaImage};

    struct FixedLocator(Vec<BoundingBox>);

    impl FaceLocator for FixedLocator {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<BoundingBox> {
            self.0.clone()
        }
    }

    fn make_test_rgb(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        img
    }

    #[test]
    fn crop_uses_first_box_in_locator_order() {
        let image = DynamicImage::ImageRgb8(make_test_rgb(300, 300));
        let locator = FixedLocator(vec![
            BoundingBox::new(100, 100, 50, 50),
            BoundingBox::new(0, 0, 200, 200),
        ]);
        let cropped = crop_first_face(&image, 0.3, &locator).unwrap();
        assert_eq!(cropped.face, BoundingBox::new(100, 100, 50, 50));
        assert_eq!((cropped.crop.x1, cropped.crop.y1), (85, 85));
        assert_eq!((cropped.image.width(), cropped.image.height()), (80, 80));
    }

    #[test]
    fn crop_keeps_source_pixels() {
        let rgb = make_test_rgb(120, 90);
        let expected = *rgb.get_pixel(40, 30);
        let image = DynamicImage::ImageRgb8(rgb);
        let locator = FixedLocator(vec![BoundingBox::new(40, 30, 20, 20)]);
        let cropped = crop_first_face(&image, 0.0, &locator).unwrap();
        assert_eq!(cropped.image.to_rgb8().get_pixel(0, 0), &expected);
    }

    #[test]
    fn grayscale_buffer_reaches_locator() {
        struct Checking;
        impl FaceLocator for Checking {
            fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<BoundingBox> {
                assert_eq!(gray.len(), (width * height) as usize);
                assert_eq!((width, height), (30, 20));
                vec![]
            }
        }
        let image = DynamicImage::ImageRgb8(make_test_rgb(30, 20));
        let err = crop_first_face(&image, 0.3, &Checking).unwrap_err();
        assert!(matches!(err, FaceCropError::NoFaceFound));
    }

    #[test]
    fn box_outside_image_is_rejected() {
        let image = DynamicImage::ImageRgb8(make_test_rgb(50, 50));
        let locator = FixedLocator(vec![BoundingBox::new(80, 80, 10, 10)]);
        let err = crop_first_face(&image, 0.3, &locator).unwrap_err();
        assert!(matches!(err, FaceCropError::EmptyCrop));
    }

    #[test]
    fn invalid_margins_are_rejected() {
        assert!(matches!(validate_margin(-0.1), Err(FaceCropError::InvalidMargin(_))));
        assert!(matches!(validate_margin(f64::NAN), Err(FaceCropError::InvalidMargin(_))));
        assert!(matches!(validate_margin(f64::INFINITY), Err(FaceCropError::InvalidMargin(_))));
        assert!(validate_margin(0.0).is_ok());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_image(b"not an image").unwrap_err();
        assert!(matches!(err, FaceCropError::DecodeError(_)));
    }

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(output_format(Path::new("a/b.png")).unwrap(), ImageFormat::Png);
        assert_eq!(output_format(Path::new("face.JPG")).unwrap(), ImageFormat::Jpeg);
        assert!(matches!(
            output_format(Path::new("face")),
            Err(FaceCropError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            output_format(Path::new("face.txt")),
            Err(FaceCropError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn encode_jpeg_flattens_alpha() {
        let mut rgba = RgbaImage::new(8, 8);
        for pixel in rgba.pixels_mut() {
            *pixel = image::Rgba([255, 0, 0, 0]);
        }
        let data = encode_image(&DynamicImage::ImageRgba8(rgba), ImageFormat::Jpeg).unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&data).unwrap().to_rgb8();
        assert!(decoded.get_pixel(4, 4).0.iter().all(|&c| c > 240));
    }

    #[test]
    fn encode_png_keeps_grayscale() {
        let gray = GrayImage::from_pixel(4, 4, Luma([77]));
        let data = encode_image(&DynamicImage::ImageLuma8(gray), ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.color(), ColorType::L8);
    }

    #[test]
    fn flatten_alpha_blends_toward_white() {
        let rgba = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => image::Rgba([255, 0, 0, 0]),
            1 => image::Rgba([0, 0, 0, 128]),
            _ => image::Rgba([100, 150, 200, 255]),
        });
        let rgb = flatten_alpha(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.get_pixel(0, 0), &image::Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(1, 0), &image::Rgb([127, 127, 127]));
        assert_eq!(rgb.get_pixel(2, 0), &image::Rgb([100, 150, 200]));
    }

    #[test]
    fn sixteen_bit_gray_is_converted_for_bmp() {
        let gray = ImageBuffer::from_pixel(6, 4, Luma([40_000u16]));
        let data = encode_image(&DynamicImage::ImageLuma16(gray), ImageFormat::Bmp).unwrap();
        let decoded = image::load_from_memory_with_format(&data, ImageFormat::Bmp).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
    }

    #[test]
    fn grayscale_is_converted_for_gif() {
        let gray = GrayImage::from_pixel(5, 5, Luma([90]));
        let data = encode_image(&DynamicImage::ImageLuma8(gray), ImageFormat::Gif).unwrap();
        assert_eq!(&data[0..3], b"GIF");
    }

    #[test]
    fn sixteen_bit_rgba_is_flattened_for_jpeg() {
        let rgba = ImageBuffer::from_pixel(4, 4, image::Rgba([0u16, 0, 65_535, 65_535]));
        let data = encode_image(&DynamicImage::ImageRgba16(rgba), ImageFormat::Jpeg).unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn supported_layouts_are_not_converted() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        assert!(convert_for(&rgba, ImageFormat::Png).is_none());
        assert!(convert_for(&rgba, ImageFormat::Gif).is_none());
        let converted = convert_for(&rgba, ImageFormat::Jpeg).unwrap();
        assert_eq!(converted.color(), ColorType::Rgb8);
    }

    #[test]
    fn write_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        DynamicImage::ImageRgb8(make_test_rgb(60, 60)).save(&input).unwrap();
        let output = dir.path().join("missing-dir").join("out.png");
        let locator = FixedLocator(vec![BoundingBox::new(10, 10, 20, 20)]);

        let err = crop_file_pipeline(&input, &output, 0.3, &locator).unwrap_err();
        assert!(matches!(err, FaceCropError::WriteError { .. }));
        assert!(!output.exists());
    }
}
