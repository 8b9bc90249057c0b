//! Auto-cropped brand logo for the page header.

use intake_imaging::{LogoImage, crop_or_original};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::{WebError, console_warn, window};
use crate::raster::bytes_to_blob_url;

/// Fetch the logo at `asset_url`, trim its padding, and return a Blob
/// URL for the cropped PNG.
///
/// Never fails: if fetching, decoding, or cropping goes wrong the
/// original `asset_url` is returned so the header still shows the
/// uncropped logo. A returned Blob URL should eventually be released
/// with [`revoke_blob_url`](crate::raster::revoke_blob_url).
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn cropped_logo_url(asset_url: &str) -> String {
    match try_cropped_logo_url(asset_url).await {
        Ok(Some(url)) => url,
        Ok(None) => asset_url.to_owned(),
        Err(e) => {
            console_warn(&format!("logo fetch failed for {asset_url}: {e}"));
            asset_url.to_owned()
        }
    }
}

#[allow(clippy::future_not_send)]
async fn try_cropped_logo_url(asset_url: &str) -> Result<Option<String>, WebError> {
    let response = JsFuture::from(window()?.fetch_with_str(asset_url))
        .await?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| WebError::JsError("fetch did not return a Response".into()))?;
    if !response.ok() {
        return Err(WebError::JsError(format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    match crop_or_original(bytes) {
        LogoImage::Cropped { image, .. } => {
            Ok(Some(bytes_to_blob_url(image.as_bytes(), image.mime_type())?))
        }
        LogoImage::Original(_) => {
            console_warn(&format!("logo crop failed for {asset_url}, showing original"));
            Ok(None)
        }
    }
}
