/// Axis-aligned bounding box of a detected face, in pixels.
///
/// Boxes produced by a [`FaceLocator`] always lie inside the image they were
/// detected in: `x + width <= image_width` and `y + height <= image_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// X coordinate of the top-left corner.
    pub x: u32,
    /// Y coordinate of the top-left corner.
    pub y: u32,
    /// Width of the box.
    pub width: u32,
    /// Height of the box.
    pub height: u32,
}

impl BoundingBox {
    /// Create a box from its top-left corner and size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect a raw detector rectangle with a `image_width` × `image_height`
    /// image.
    ///
    /// Detectors may report rectangles that hang over the image border (or
    /// start at negative coordinates). Returns `None` when nothing of the
    /// rectangle is left inside the image.
    pub fn clamped(
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    ) -> Option<Self> {
        let (x1, x2) = clamp_span(x, width, image_width);
        let (y1, y2) = clamp_span(y, height, image_height);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::new(x1, y1, x2 - x1, y2 - y1))
    }
}

fn clamp_span(start: i64, len: u32, limit: u32) -> (u32, u32) {
    let limit = i64::from(limit);
    let lo = start.clamp(0, limit);
    let hi = (start + i64::from(len)).clamp(0, limit);
    (lo as u32, hi as u32)
}

/// Pluggable face detection backend.
///
/// Implementations are expected to be expensive to build and cheap to call:
/// construct one at startup and hand the same instance to every crop.
pub trait FaceLocator: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    ///
    /// The order of the returned boxes is backend-defined; the crop pipeline
    /// uses the first one.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<BoundingBox>;
}

impl<T: FaceLocator + ?Sized> FaceLocator for std::sync::Arc<T> {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<BoundingBox> {
        (**self).detect(gray, width, height)
    }
}

impl<T: FaceLocator + ?Sized> FaceLocator for Box<T> {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<BoundingBox> {
        (**self).detect(gray, width, height)
    }
}
