//! Uploaded signature images: validation and fit-to-surface placement.
//!
//! An upload is checked (MIME type, size) before anything is decoded,
//! then placed on the surface: scaled down uniformly if it is larger
//! than the surface on either axis, never scaled up, and centered.

use crate::canvas::DestRect;
use crate::types::{Dimensions, SignatureError};

/// A file chosen by the user, as handed over by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original file name, for messages only.
    pub name: String,
    /// Declared MIME type (e.g. `image/png`).
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Bundle an upload.
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Reject non-image types and files over `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::InvalidFileType`] if the declared MIME
    /// type is not `image/*` (ASCII case-insensitive).
    /// Returns [`SignatureError::FileTooLarge`] if the file is larger
    /// than `max_bytes`.
    pub fn validate(&self, max_bytes: u64) -> Result<(), SignatureError> {
        if !is_image_mime(&self.mime_type) {
            return Err(SignatureError::InvalidFileType(self.mime_type.clone()));
        }
        let size = self.size();
        if size > max_bytes {
            return Err(SignatureError::FileTooLarge {
                size,
                limit: max_bytes,
            });
        }
        Ok(())
    }
}

/// `true` for any `image/<subtype>` MIME type.
fn is_image_mime(mime: &str) -> bool {
    mime.trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Where an image of size `source` lands on a surface of size `surface`.
///
/// Uses the uniform factor `min(W / w, H / h)` only when the source is
/// larger than the surface on either axis, so aspect ratio is kept and
/// small images are never enlarged. The result is centered on both axes.
#[must_use]
pub fn fit_within(source: Dimensions, surface: Dimensions) -> DestRect {
    let (src_w, src_h) = (f64::from(source.width), f64::from(source.height));
    let (dst_w, dst_h) = (f64::from(surface.width), f64::from(surface.height));

    let scale = if src_w > dst_w || src_h > dst_h {
        (dst_w / src_w).min(dst_h / src_h)
    } else {
        1.0
    };

    let width = src_w * scale;
    let height = src_h * scale;
    DestRect {
        x: (dst_w - width) / 2.0,
        y: (dst_h - height) / 2.0,
        width,
        height,
    }
}
