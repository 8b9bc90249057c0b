//! Logo auto-crop: trim padded margins from a raster.
//!
//! Two phases, the second only runs if the first fails:
//!
//! 1. **Transparency trim.** Any pixel with alpha above
//!    [`ALPHA_THRESHOLD`] is content. The candidate box is the extent of
//!    all content pixels; it is accepted if it spans more than one row
//!    and more than one column, even when it covers the whole frame. A
//!    fully opaque image has no transparency to trim and skips straight
//!    to phase 2.
//! 2. **Background trim.** The background colour is the mean of the four
//!    corner pixels. Each edge advances inward independently while the
//!    whole row (or column) at that edge stays within
//!    [`BACKGROUND_TOLERANCE`] of the background. If the result does not
//!    span an area, the full image is used.
//!
//! The result is never empty or inverted.

use serde::{Deserialize, Serialize};

use crate::codec::{self, EncodedImage};
use crate::types::{BackgroundColor, BoundingBox, CropError, ImagingError, RasterBuffer};

/// Pixels with alpha strictly above this count as content in phase 1.
pub const ALPHA_THRESHOLD: u8 = 5;

/// Maximum summed RGB difference for a pixel to match the background.
pub const BACKGROUND_TOLERANCE: f64 = 42.0;

/// Which phase produced the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimMethod {
    /// Phase 1: transparent margins removed.
    Transparency,
    /// Phase 2: background-coloured margins removed.
    Background,
    /// Neither phase found a usable box; the full image is kept.
    Full,
}

/// A crop box and how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBounds {
    /// Inclusive crop rectangle.
    pub bounds: BoundingBox,
    /// Phase that produced it.
    pub method: TrimMethod,
}

/// Phase 1: extent of all pixels with alpha above [`ALPHA_THRESHOLD`].
///
/// Returns `None` when no pixel qualifies. The box may still be a single
/// row or column; callers check [`BoundingBox::spans_area`].
#[must_use]
pub fn transparent_bounds(raster: &RasterBuffer) -> Option<BoundingBox> {
    let mut found: Option<BoundingBox> = None;
    for (x, y, pixel) in raster.as_image().enumerate_pixels() {
        if pixel.0[3] <= ALPHA_THRESHOLD {
            continue;
        }
        found = Some(match found {
            None => BoundingBox::new(x, y, x, y),
            Some(b) => BoundingBox::new(b.left.min(x), b.top.min(y), b.right.max(x), b.bottom.max(y)),
        });
    }
    found
}

/// `true` if no pixel has alpha at or below [`ALPHA_THRESHOLD`].
#[must_use]
pub fn is_fully_opaque(raster: &RasterBuffer) -> bool {
    raster.as_image().pixels().all(|p| p.0[3] > ALPHA_THRESHOLD)
}

/// Per-channel mean of the four corner pixels.
#[must_use]
pub fn background_color(raster: &RasterBuffer) -> BackgroundColor {
    let (w, h) = (raster.width(), raster.height());
    let corners = [
        raster.pixel(0, 0),
        raster.pixel(w - 1, 0),
        raster.pixel(0, h - 1),
        raster.pixel(w - 1, h - 1),
    ];
    let mean = |channel: usize| corners.iter().map(|p| f64::from(p[channel])).sum::<f64>() / 4.0;
    BackgroundColor {
        r: mean(0),
        g: mean(1),
        b: mean(2),
        a: mean(3),
    }
}

/// Phase 2: trim rows and columns matching `background` from each edge.
///
/// The four edges are scanned independently. Returns `None` when every
/// row (or every column) matches the background, i.e. there is nothing
/// left to keep.
#[must_use]
pub fn background_bounds(raster: &RasterBuffer, background: &BackgroundColor) -> Option<BoundingBox> {
    let (w, h) = (raster.width(), raster.height());
    let matches = |x: u32, y: u32| background.delta(raster.pixel(x, y)) <= BACKGROUND_TOLERANCE;
    let row_is_background = |y: u32| (0..w).all(|x| matches(x, y));
    let column_is_background = |x: u32| (0..h).all(|y| matches(x, y));

    let top = (0..h).find(|&y| !row_is_background(y))?;
    let bottom = (0..h).rev().find(|&y| !row_is_background(y))?;
    let left = (0..w).find(|&x| !column_is_background(x))?;
    let right = (0..w).rev().find(|&x| !column_is_background(x))?;

    Some(BoundingBox::new(left, top, right, bottom))
}

/// Run both phases and pick the crop box.
#[must_use]
pub fn find_content_bounds(raster: &RasterBuffer) -> CropBounds {
    let full = BoundingBox::full(raster.dimensions());

    if !is_fully_opaque(raster)
        && let Some(bounds) = transparent_bounds(raster).filter(BoundingBox::spans_area)
    {
        return CropBounds {
            bounds,
            method: TrimMethod::Transparency,
        };
    }

    let background = background_color(raster);
    if let Some(bounds) = background_bounds(raster, &background).filter(BoundingBox::spans_area) {
        return CropBounds {
            bounds,
            method: TrimMethod::Background,
        };
    }

    CropBounds {
        bounds: full,
        method: TrimMethod::Full,
    }
}

/// Copy the `bounds` sub-rectangle into a new raster, without scaling.
///
/// # Errors
///
/// Returns [`ImagingError::Canvas`] if `bounds` lies outside `raster`.
pub fn crop(raster: &RasterBuffer, bounds: &BoundingBox) -> Result<RasterBuffer, ImagingError> {
    if bounds.right >= raster.width() || bounds.bottom >= raster.height() {
        return Err(ImagingError::Canvas(format!(
            "crop box {bounds:?} lies outside the {}x{} image",
            raster.width(),
            raster.height()
        )));
    }
    let view = image::imageops::crop_imm(
        raster.as_image(),
        bounds.left,
        bounds.top,
        bounds.width(),
        bounds.height(),
    );
    RasterBuffer::from_image(view.to_image())
}

/// Find the content box and crop to it.
///
/// # Errors
///
/// Propagates errors from [`crop`].
pub fn auto_crop(raster: &RasterBuffer) -> Result<(RasterBuffer, CropBounds), ImagingError> {
    let found = find_content_bounds(raster);
    let cropped = crop(raster, &found.bounds)?;
    tracing::debug!(
        method = ?found.method,
        width = cropped.width(),
        height = cropped.height(),
        "auto-cropped {}x{} image",
        raster.width(),
        raster.height()
    );
    Ok((cropped, found))
}

/// Decode, auto-crop, and re-encode as PNG.
///
/// # Errors
///
/// Returns [`CropError::CropFailed`] if decoding, cropping, or encoding
/// fails.
pub fn auto_crop_encoded(bytes: &[u8]) -> Result<(EncodedImage, CropBounds), CropError> {
    let raster = codec::decode(bytes)?;
    let (cropped, found) = auto_crop(&raster)?;
    let encoded = codec::encode_png(&cropped)?;
    Ok((encoded, found))
}

/// A logo ready to display: cropped if possible, otherwise the source
/// bytes unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoImage {
    /// Trimmed PNG.
    Cropped {
        /// Encoded PNG of the cropped logo.
        image: EncodedImage,
        /// Where the crop came from.
        bounds: CropBounds,
    },
    /// Cropping failed; the original bytes.
    Original(Vec<u8>),
}

impl LogoImage {
    /// Bytes to display.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Cropped { image, .. } => image.as_bytes(),
            Self::Original(bytes) => bytes,
        }
    }

    /// `true` if the crop succeeded.
    #[must_use]
    pub const fn is_cropped(&self) -> bool {
        matches!(self, Self::Cropped { .. })
    }
}

/// [`auto_crop_encoded`], falling back to the original bytes on failure.
#[must_use]
pub fn crop_or_original(bytes: Vec<u8>) -> LogoImage {
    match auto_crop_encoded(&bytes) {
        Ok((image, bounds)) => LogoImage::Cropped { image, bounds },
        Err(e) => {
            tracing::warn!("logo crop failed, showing original: {e}");
            LogoImage::Original(bytes)
        }
    }
}
