//! Unwrapping of extraction API bodies.
//!
//! Depending on the relay, the API's JSON arrives as-is, inside an
//! allorigins-style `{"contents": "<json text>"}` envelope, or encoded a
//! second time as a JSON string. Each shape gets its own decoder and the
//! decoders are tried in order.

use serde::Deserialize;

use crate::model::ApiResponse;

type Decoder = fn(&str) -> Option<ApiResponse>;

const DECODERS: &[(&str, Decoder)] = &[
    ("raw", decode_raw),
    ("envelope", decode_envelope),
    ("double-encoded", decode_double_encoded),
];

#[derive(Deserialize)]
struct Envelope {
    contents: String,
}

/// Return the first interpretation of `body` that is a usable API response.
pub fn decode_response(body: &str) -> Option<ApiResponse> {
    DECODERS.iter().find_map(|(name, decode)| {
        let response = decode(body).filter(ApiResponse::is_usable)?;
        tracing::debug!("decoded response as {name}");
        Some(response)
    })
}

fn decode_raw(body: &str) -> Option<ApiResponse> {
    serde_json::from_str(body).ok()
}

fn decode_envelope(body: &str) -> Option<ApiResponse> {
    let envelope: Envelope = serde_json::from_str(body).ok()?;
    decode_raw(&envelope.contents).or_else(|| decode_double_encoded(&envelope.contents))
}

fn decode_double_encoded(body: &str) -> Option<ApiResponse> {
    let inner: String = serde_json::from_str(body).ok()?;
    decode_raw(&inner)
}

/// Unwrap an allorigins `get` envelope around an HTML page. Bodies that are
/// not an envelope are assumed to be the page itself.
pub fn unwrap_html(body: &str) -> String {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.contents,
        Err(_) => body.to_string(),
    }
}
