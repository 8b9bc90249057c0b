//! Error type for the browser bindings.

use intake_imaging::{ImagingError, SignatureError};
use wasm_bindgen::JsValue;

/// Errors raised by browser glue.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// A browser API call returned an error or a required object was missing.
    #[error("browser API error: {0}")]
    JsError(String),

    /// The signature surface rejected the operation.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Raster decode/encode failed.
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<WebError> for ImagingError {
    fn from(err: WebError) -> Self {
        match err {
            WebError::Imaging(inner) => inner,
            other => Self::Canvas(other.to_string()),
        }
    }
}

/// Fetch the global `window`.
pub(crate) fn window() -> Result<web_sys::Window, WebError> {
    web_sys::window().ok_or_else(|| WebError::JsError("no global window".into()))
}

/// Log a failure that has no caller to return to on the browser console.
pub(crate) fn console_warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}
