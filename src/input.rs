use std::sync::LazyLock;

use regex::Regex;

/// Hosts a pasted link may point at, most specific spelled out in full.
const HOSTS: &str =
    r"tiktok\.com|vm\.tiktok\.com|m\.tiktok\.com|vt\.tiktok\.com|lite\.tiktok\.com|tiktoklite\.com";

static EMBEDDED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)https?://(www\.)?({HOSTS})[^\s]*")).expect("valid regex")
});

static ANCHORED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^https?://(www\.)?({HOSTS})")).expect("valid regex")
});

/// Reasons user input is rejected before any network request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Please enter a TikTok video URL")]
    Empty,
    #[error("Please enter a valid TikTok URL")]
    InvalidUrl,
}

/// Pull the first TikTok link out of free-form text, e.g. the share blurb
/// the TikTok Lite app puts around its links. Returns the trimmed text when
/// no link is found.
pub fn extract_tiktok_url(text: &str) -> String {
    match EMBEDDED_URL.find(text) {
        Some(m) => m.as_str().to_string(),
        None => text.trim().to_string(),
    }
}

pub fn is_valid_tiktok_url(url: &str) -> bool {
    ANCHORED_URL.is_match(url)
}

/// Turn raw pasted text into a candidate URL ready for resolution.
pub fn normalize_input(raw: &str) -> Result<String, InputError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(InputError::Empty);
    }

    let url = extract_tiktok_url(text);
    if !is_valid_tiktok_url(&url) {
        return Err(InputError::InvalidUrl);
    }

    Ok(url)
}
