use crate::face_locator::BoundingBox;

/// Default extra border around the face, as a fraction of the face size.
pub const DEFAULT_MARGIN_RATIO: f64 = 0.3;

/// Crop rectangle in source image coordinates, as two corners.
///
/// `(x1, y1)` is inclusive and `(x2, y2)` exclusive. Rectangles returned by
/// [`compute_crop`] satisfy `x1 <= x2 <= image_width` and
/// `y1 <= y2 <= image_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub x1: u32,
    /// Top edge.
    pub y1: u32,
    /// Right edge (exclusive).
    pub x2: u32,
    /// Bottom edge (exclusive).
    pub y2: u32,
}

impl CropRect {
    /// Width of the rectangle in pixels.
    pub const fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Height of the rectangle in pixels.
    pub const fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// `true` when the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }
}

/// Expand `bbox` by `margin_ratio` of its width and height on each side and
/// clamp the result to the image.
///
/// The margin on each axis is `floor(size * margin_ratio)`. A negative or NaN
/// ratio adds no margin. A box that lies completely outside the image
/// collapses to an empty rectangle on the nearest edge.
pub fn compute_crop(
    bbox: &BoundingBox,
    image_width: u32,
    image_height: u32,
    margin_ratio: f64,
) -> CropRect {
    let margin_x = margin_for(bbox.width, margin_ratio);
    let margin_y = margin_for(bbox.height, margin_ratio);

    let (x1, x2) = expand_span(bbox.x, bbox.width, margin_x, image_width);
    let (y1, y2) = expand_span(bbox.y, bbox.height, margin_y, image_height);

    CropRect { x1, y1, x2, y2 }
}

fn margin_for(size: u32, ratio: f64) -> u64 {
    // `as` saturates: NaN and negatives become 0.
    (f64::from(size) * ratio).floor() as u64
}

fn expand_span(start: u32, len: u32, margin: u64, limit: u32) -> (u32, u32) {
    let limit = u64::from(limit);
    let start = u64::from(start);
    let lo = start.saturating_sub(margin).min(limit);
    let hi = (start + u64::from(len))
        .saturating_add(margin)
        .min(limit)
        .max(lo);
    (lo as u32, hi as u32)
}
