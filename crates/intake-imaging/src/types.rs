//! Shared types for signature capture and logo auto-cropping.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hand decoded images
/// around without depending on `image` directly.
pub use image::RgbaImage;

/// Opaque white. Every signature surface is flattened onto this.
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Opaque black, the stroke colour.
pub const BLACK: [u8; 4] = [0, 0, 0, 255];

/// A 2D point in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new set of dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A decoded bitmap: width, height, and straight (non-premultiplied)
/// RGBA bytes.
///
/// Always non-empty: construction rejects zero-sized images and pixel
/// buffers whose length is not `width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer(RgbaImage);

impl RasterBuffer {
    /// Build a raster from raw RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidRaster`] if either dimension is
    /// zero or `pixels.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImagingError> {
        let len = pixels.len();
        if width == 0 || height == 0 {
            return Err(ImagingError::InvalidRaster { width, height, len });
        }
        RgbaImage::from_raw(width, height, pixels)
            .map(Self)
            .ok_or(ImagingError::InvalidRaster { width, height, len })
    }

    /// Allocate a raster of the given size filled with one colour.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidRaster`] if `dimensions` is empty.
    pub fn filled(dimensions: Dimensions, rgba: [u8; 4]) -> Result<Self, ImagingError> {
        Self::from_image(RgbaImage::from_pixel(
            dimensions.width,
            dimensions.height,
            image::Rgba(rgba),
        ))
    }

    /// Wrap an already-decoded `RgbaImage`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidRaster`] if the image is empty.
    pub fn from_image(image: RgbaImage) -> Result<Self, ImagingError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ImagingError::InvalidRaster {
                width: image.width(),
                height: image.height(),
                len: image.as_raw().len(),
            });
        }
        Ok(Self(image))
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Width and height together.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.0.width(), self.0.height())
    }

    /// RGBA value at `(x, y)`.
    ///
    /// Out-of-bounds coordinates return transparent black.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.0.get_pixel_checked(x, y).map_or([0; 4], |p| p.0)
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.0.as_raw()
    }

    /// Borrow the underlying `RgbaImage`.
    #[must_use]
    pub const fn as_image(&self) -> &RgbaImage {
        &self.0
    }

    /// Consume the raster and return the underlying `RgbaImage`.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.0
    }
}

/// Inclusive pixel rectangle inside a [`RasterBuffer`].
///
/// `0 <= left <= right < width` and `0 <= top <= bottom < height`.
/// "No content found" is modelled as `Option::<BoundingBox>::None`
/// rather than a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Leftmost column (inclusive).
    pub left: u32,
    /// Topmost row (inclusive).
    pub top: u32,
    /// Rightmost column (inclusive).
    pub right: u32,
    /// Bottom row (inclusive).
    pub bottom: u32,
}

impl BoundingBox {
    /// Create a box from inclusive edges.
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The box covering every pixel of a non-empty image.
    #[must_use]
    pub const fn full(dimensions: Dimensions) -> Self {
        Self {
            left: 0,
            top: 0,
            right: dimensions.width.saturating_sub(1),
            bottom: dimensions.height.saturating_sub(1),
        }
    }

    /// Number of columns covered, never less than 1.
    #[must_use]
    pub const fn width(&self) -> u32 {
        let w = self.right.saturating_sub(self.left).saturating_add(1);
        if w == 0 { 1 } else { w }
    }

    /// Number of rows covered, never less than 1.
    #[must_use]
    pub const fn height(&self) -> u32 {
        let h = self.bottom.saturating_sub(self.top).saturating_add(1);
        if h == 0 { 1 } else { h }
    }

    /// `true` when the box spans more than one column AND more than one
    /// row. Single-row or single-column boxes do not count as a trim.
    #[must_use]
    pub const fn spans_area(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }
}

/// Estimated background colour of an opaque logo.
///
/// Channels are the per-channel mean of the four corner pixels, kept
/// fractional (0.0 to 255.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundColor {
    /// Red channel mean.
    pub r: f64,
    /// Green channel mean.
    pub g: f64,
    /// Blue channel mean.
    pub b: f64,
    /// Alpha channel mean.
    pub a: f64,
}

impl BackgroundColor {
    /// Sum of absolute RGB differences between `pixel` and this colour.
    /// Alpha is ignored.
    #[must_use]
    pub fn delta(&self, pixel: [u8; 4]) -> f64 {
        (f64::from(pixel[0]) - self.r).abs()
            + (f64::from(pixel[1]) - self.g).abs()
            + (f64::from(pixel[2]) - self.b).abs()
    }
}

/// Configuration for a signature surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Surface width in pixels.
    pub width: u32,

    /// Surface height in pixels.
    pub height: u32,

    /// Quiet period after the last change before the surface emits.
    pub settle_delay_ms: u64,

    /// Largest accepted upload, in bytes (inclusive).
    pub max_upload_bytes: u64,
}

impl SignatureConfig {
    /// Default surface width.
    pub const DEFAULT_WIDTH: u32 = 400;
    /// Default surface height.
    pub const DEFAULT_HEIGHT: u32 = 150;
    /// Default trailing debounce delay.
    pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
    /// Default upload limit: 5 MiB.
    pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

    /// Surface dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Debounce delay as a `Duration`.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Check the configuration for values no surface can work with.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidConfig`] for a zero-sized surface
    /// or a zero upload limit.
    pub fn validate(&self) -> Result<(), ImagingError> {
        if self.dimensions().is_empty() {
            return Err(ImagingError::InvalidConfig(format!(
                "surface must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ImagingError::InvalidConfig(
                "max_upload_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            settle_delay_ms: Self::DEFAULT_SETTLE_DELAY_MS,
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Errors from the raster primitives: decode, encode, allocation.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    ImageEncode(String),

    /// Pixel data does not describe a non-empty `width x height` RGBA image.
    #[error("invalid raster: {width}x{height} with {len} bytes")]
    InvalidRaster {
        /// Claimed width.
        width: u32,
        /// Claimed height.
        height: u32,
        /// Actual byte length.
        len: usize,
    },

    /// A drawing surface of this size could not be allocated.
    #[error("cannot allocate a {width}x{height} canvas")]
    CanvasAllocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A drawing operation on the canvas failed.
    #[error("canvas operation failed: {0}")]
    Canvas(String),

    /// A `data:` URL was malformed or not base64-encoded.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors surfaced by [`SignatureSurface`](crate::SignatureSurface)
/// operations. Every failing operation leaves the canvas untouched.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The upload's declared MIME type is not `image/*`.
    #[error("unsupported file type {0:?}: please select an image file")]
    InvalidFileType(String),

    /// The upload exceeds the configured size limit.
    #[error("file is {size} bytes; the limit is {limit} bytes")]
    FileTooLarge {
        /// Upload size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The uploaded or existing signature could not be decoded.
    #[error("failed to decode signature image: {0}")]
    Decode(#[source] ImagingError),

    /// `save` was called on a blank surface.
    #[error("no signature has been captured")]
    NoSignaturePresent,

    /// Encoding or canvas failure.
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

/// Errors from [`auto_crop`](crate::autocrop::auto_crop_encoded).
///
/// Callers are expected to fall back to the original, uncropped image.
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// Decoding, cropping, or re-encoding failed.
    #[error("crop failed: {0}")]
    CropFailed(#[from] ImagingError),
}
