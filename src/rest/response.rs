//! Normalized HTTP outcome

use serde::Serialize;
use serde::de::DeserializeOwned;
use ureq::http::HeaderMap;

/// Body of the descriptor returned when the transport fails
pub const NETWORK_ERROR_MESSAGE: &str = "Failed to make request.";

/// Body of the descriptor returned when the request times out
pub const TIMEOUT_MESSAGE: &str = "Request took longer than expected.";

/// Outcome of a REST call. Always populated, even when the call failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestResponse {
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub data: String,
    pub headers: String,
    #[serde(skip)]
    json_source: String,
}

impl RestResponse {
    /// Descriptor for a response the server actually sent
    pub fn completed(status: u16, status_text: impl Into<String>, headers: String, data: String) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status,
            status_text: status_text.into(),
            json_source: data.clone(),
            data,
            headers,
        }
    }

    /// Descriptor for a request that never produced a response.
    ///
    /// The message is JSON-quoted for `json()`, so decoding it as a string
    /// yields the message itself.
    pub fn failed(message: &str) -> Self {
        Self {
            ok: false,
            status: 0,
            status_text: String::new(),
            data: message.to_string(),
            headers: String::new(),
            json_source: serde_json::Value::from(message).to_string(),
        }
    }

    pub fn network_error() -> Self {
        Self::failed(NETWORK_ERROR_MESSAGE)
    }

    pub fn timeout() -> Self {
        Self::failed(TIMEOUT_MESSAGE)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.json_source)
    }
}

/// Render headers the way `getAllResponseHeaders` does: `name: value\r\n` per entry
pub fn raw_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes())))
        .collect()
}
