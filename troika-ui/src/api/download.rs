//! Save-as for files produced in the browser or fetched from the backend

use wasm_bindgen::JsCast;

use troika::{ClientError, ClientResult};

fn js_error(e: wasm_bindgen::JsValue) -> ClientError {
    ClientError::Storage(format!("{:?}", e))
}

/// Offer `bytes` to the user as a download named `filename`
pub fn trigger_download(bytes: &[u8], filename: &str, mime: &str) -> ClientResult<()> {
    let window = web_sys::window().ok_or_else(|| ClientError::Storage("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ClientError::Storage("no document".into()))?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes).into());
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(js_error)?;

    let href = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| ClientError::Storage("anchor cast failed".into()))?;
    anchor.set_href(&href);
    anchor.set_download(filename);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&href);
    Ok(())
}
