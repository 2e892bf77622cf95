use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Marker file served next to the page, loaded on boot when present.
pub const DEFAULT_MARKER_URL: &str = "markers.json";

/// Fetch a marker file as raw bytes. Parsing is left to the session so a
/// bad file never disturbs the markers already on screen.
pub async fn fetch_marker_file(url: &str) -> Result<Vec<u8>, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.binary().await.map_err(|e| format!("read error: {e}"))
}

/// Read a file dropped onto the map.
pub async fn read_dropped_file(file: web_sys::File) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("read error: {e:?}"))?;
    let buffer: js_sys::ArrayBuffer = buffer
        .dyn_into()
        .map_err(|_| "read error: not an ArrayBuffer".to_string())?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// First file of a drop, if any.
pub fn first_dropped_file(event: &web_sys::DragEvent) -> Option<web_sys::File> {
    event.data_transfer()?.files()?.get(0)
}
