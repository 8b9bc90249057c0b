//! intake-web: Browser bindings for signature capture and logo cropping.
//!
//! Implements the `intake-imaging` [`Canvas`](intake_imaging::Canvas)
//! on an `HtmlCanvasElement`, translates DOM mouse/touch events into
//! normalized pointer input, drives the signature emission debounce
//! with a browser timer, and serves auto-cropped logos as Blob URLs.

pub mod canvas;
pub mod clock;
pub mod error;
pub mod logo;
pub mod pad;
pub mod pointer;
pub mod raster;
pub mod upload;

pub use canvas::HtmlCanvas;
pub use clock::WebClock;
pub use error::WebError;
pub use logo::cropped_logo_url;
pub use pad::SignaturePad;
