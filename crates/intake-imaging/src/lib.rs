//! intake-imaging: Signature capture and logo auto-crop (sans-IO).
//!
//! Two independent raster components used by the intake form:
//!
//! - [`SignatureSurface`]: a fixed-size drawing surface fed by
//!   normalized pointer events or uploaded images, emitting the
//!   signature as a PNG through a debounced change callback.
//! - [`autocrop`]: two-phase trimming of padded logos (transparent
//!   margins first, then background-coloured margins), never producing
//!   an empty result.
//!
//! This crate has **no I/O dependencies**. It works on in-memory byte
//! slices and an abstract [`Canvas`]; the browser binding lives in
//! `intake-web` and the filesystem front end in `intake-cli`.

pub mod autocrop;
pub mod canvas;
pub mod clock;
pub mod codec;
pub mod debounce;
pub mod pointer;
pub mod signature;
pub mod types;
pub mod upload;

pub use autocrop::{CropBounds, LogoImage, TrimMethod, auto_crop, auto_crop_encoded, crop_or_original};
pub use canvas::{Canvas, DestRect, SkiaCanvas, StrokeStyle};
pub use clock::{Clock, ManualClock, StdClock};
pub use codec::{EncodedImage, ImageSource};
pub use debounce::Debouncer;
pub use pointer::{EventDisposition, PointerInput, PointerKind, PointerPhase, SurfaceGeometry};
pub use signature::{SignatureChange, SignatureSurface};
pub use types::{
    BackgroundColor, BoundingBox, CropError, Dimensions, ImagingError, Point, RasterBuffer,
    SignatureConfig, SignatureError,
};
pub use upload::{UploadedFile, fit_within};
