//! Image decode and encode primitives.
//!
//! Raw bytes (PNG, JPEG, BMP, WebP, GIF) or a `data:` URL in, a
//! [`RasterBuffer`] out; a [`RasterBuffer`] in, PNG bytes out. Every
//! other module goes through these two functions so the codec choice
//! lives in one place.

use base64::Engine as _;
use image::ImageEncoder;

use crate::types::{ImagingError, RasterBuffer};

/// MIME type of every image this crate produces.
pub const PNG_MIME: &str = "image/png";

/// Where an image to decode comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded file bytes.
    Bytes(Vec<u8>),
    /// A `data:<mime>;base64,<payload>` URL, as stored by the form.
    DataUrl(String),
}

impl ImageSource {
    /// Decode this source into a raster.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidDataUrl`] for a malformed data URL,
    /// otherwise whatever [`decode`] returns.
    pub fn decode(&self) -> Result<RasterBuffer, ImagingError> {
        match self {
            Self::Bytes(bytes) => decode(bytes),
            Self::DataUrl(url) => decode(EncodedImage::from_data_url(url)?.as_bytes()),
        }
    }
}

/// An encoded PNG image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
}

impl EncodedImage {
    /// Wrap already-encoded PNG bytes.
    #[must_use]
    pub const fn from_png_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// MIME type of the encoded data.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        PNG_MIME
    }

    /// Render as a `data:image/png;base64,...` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{PNG_MIME};base64,{payload}")
    }

    /// Parse a base64 `data:` URL.
    ///
    /// The declared MIME type is not checked; decoding sniffs the
    /// actual format from the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::InvalidDataUrl`] if the URL has no
    /// `data:` prefix, is not base64-encoded, or the payload is not
    /// valid base64.
    pub fn from_data_url(url: &str) -> Result<Self, ImagingError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| ImagingError::InvalidDataUrl("missing data: prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImagingError::InvalidDataUrl("missing ',' separator".into()))?;
        if !header.ends_with(";base64") {
            return Err(ImagingError::InvalidDataUrl(format!(
                "expected base64 payload, got header {header:?}"
            )));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ImagingError::InvalidDataUrl(e.to_string()))?;
        Ok(Self { bytes })
    }
}

/// Decode raw image bytes into an RGBA raster.
///
/// # Errors
///
/// Returns [`ImagingError::EmptyInput`] if `bytes` is empty.
/// Returns [`ImagingError::ImageDecode`] if the format is unrecognized
/// or the data is corrupt.
/// Returns [`ImagingError::InvalidRaster`] for a zero-sized image.
pub fn decode(bytes: &[u8]) -> Result<RasterBuffer, ImagingError> {
    if bytes.is_empty() {
        return Err(ImagingError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    RasterBuffer::from_image(img.to_rgba8())
}

/// Encode a raster as PNG.
///
/// # Errors
///
/// Returns [`ImagingError::ImageEncode`] if PNG encoding fails.
pub fn encode_png(raster: &RasterBuffer) -> Result<EncodedImage, ImagingError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    encoder
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ImagingError::ImageEncode(e.to_string()))?;
    Ok(EncodedImage { bytes })
}
