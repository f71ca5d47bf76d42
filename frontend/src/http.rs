// frontend/src/http.rs

use gloo_net::http::Request;
use serde::de::DeserializeOwned;

/// GET `path` on the page's own origin and decode the JSON body. Non-2xx
/// responses are errors.
pub async fn http_get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let w = web_sys::window().ok_or("no window".to_string())?;
    let origin = w
        .location()
        .origin()
        .map_err(|_| "failed to read window.location.origin".to_string())?;

    let resp = Request::get(&format!("{origin}{path}"))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<T>().await.map_err(|e| e.to_string())
}
