//! Reading a user-selected `File` into memory.

use intake_imaging::UploadedFile;
use wasm_bindgen_futures::JsFuture;

use crate::error::WebError;

/// Read the whole of `file` into an [`UploadedFile`].
///
/// No validation happens here; the signature surface checks type and
/// size before decoding.
///
/// # Errors
///
/// Returns [`WebError::JsError`] if the browser fails to read the file.
#[allow(clippy::future_not_send)] // WASM is single-threaded; File is !Send
pub async fn read_file(file: &web_sys::File) -> Result<UploadedFile, WebError> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(UploadedFile::new(file.name(), file.type_(), bytes))
}
