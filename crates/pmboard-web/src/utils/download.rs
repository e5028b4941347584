//! Browser downloads: CSV exports and attachment bytes

use chrono::{DateTime, Utc};
use leptos::logging;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Current time from the browser clock
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

fn timestamp() -> String {
    now().format("%Y%m%d-%H%M%S").to_string()
}

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Build CSV text with a UTF-8 BOM (Excel opens it as UTF-8)
pub fn to_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut csv = String::from("\u{FEFF}");
    csv.push_str(&headers.iter().map(|h| escape(h)).collect::<Vec<_>>().join(","));
    csv.push('\n');
    for row in rows {
        csv.push_str(&row.iter().map(|c| escape(c)).collect::<Vec<_>>().join(","));
        csv.push('\n');
    }
    csv
}

/// Download `rows` as `<filename>-<timestamp>.csv`
pub fn export_as_csv(headers: &[&str], rows: &[Vec<String>], filename: &str) {
    let csv = to_csv(headers, rows);
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(&csv));

    let options = BlobPropertyBag::new();
    options.set_type("text/csv");
    match Blob::new_with_str_sequence_and_options(&parts, &options) {
        Ok(blob) => trigger(&blob, &format!("{}-{}.csv", filename, timestamp())),
        Err(e) => logging::error!("Failed to create Blob: {:?}", e),
    }
}

/// Save downloaded attachment bytes under `filename`
pub fn save_bytes(bytes: &[u8], filename: &str, mime_type: &str) {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&array.buffer());

    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    match Blob::new_with_buffer_source_sequence_and_options(&parts, &options) {
        Ok(blob) => trigger(&blob, filename),
        Err(e) => logging::error!("Failed to create Blob: {:?}", e),
    }
}

/// Click a temporary anchor pointing at an object URL
fn trigger(blob: &Blob, filename: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        logging::error!("Failed to get document object");
        return;
    };

    let url = match Url::create_object_url_with_blob(blob) {
        Ok(u) => u,
        Err(e) => {
            logging::error!("Failed to create object URL: {:?}", e);
            return;
        }
    };

    match document
        .create_element("a")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok())
    {
        Some(anchor) => {
            anchor.set_href(&url);
            anchor.set_download(filename);
            anchor.click();
        }
        None => logging::error!("Failed to create anchor element"),
    }

    if let Err(e) = Url::revoke_object_url(&url) {
        logging::error!("Failed to revoke object URL: {:?}", e);
    }
}
