use std::fmt;

use serde::{Deserialize, Serialize};

/// Title used when the API returns none.
pub const DEFAULT_TITLE: &str = "TikTok Video";

/// Titles longer than this many characters are cut.
pub const MAX_TITLE_CHARS: usize = 100;

/// Message returned once every fetch target has been exhausted.
pub const EXHAUSTED_MESSAGE: &str =
    "Unable to process video. Please check if the link is valid and the video is public.";

/// Requested video quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    Normal,
    Hd,
}

impl Quality {
    /// Value of the extraction API's `hd` query parameter.
    pub fn hd_flag(self) -> &'static str {
        match self {
            Self::Normal => "0",
            Self::Hd => "1",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Hd => write!(f, "HD"),
        }
    }
}

/// Body returned by the extraction API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub data: Option<VideoData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub play: Option<String>,
    #[serde(default)]
    pub hdplay: Option<String>,
}

impl ApiResponse {
    /// A response is usable when the API reports success and carries a
    /// playable URL.
    pub fn is_usable(&self) -> bool {
        self.code == Some(0)
            && self
                .data
                .as_ref()
                .and_then(|d| d.play.as_deref())
                .is_some_and(|play| !play.is_empty())
    }

    /// Convert a usable response into the video it describes.
    pub fn into_video(self, quality: Quality) -> Option<VideoInfo> {
        if !self.is_usable() {
            return None;
        }
        let data = self.data?;
        let play = data.play.filter(|p| !p.is_empty())?;

        let title = data
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let download_url = match quality {
            Quality::Hd => data.hdplay.filter(|h| !h.is_empty()).unwrap_or(play),
            Quality::Normal => play,
        };

        Some(VideoInfo {
            title: truncate_title(&title),
            download_url,
        })
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

/// Video accepted from a usable API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
    pub download_url: String,
}

/// Outcome of one extraction request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Success { title: String, download_url: String },
    Failure { error: String },
}

impl From<VideoInfo> for ExtractionResult {
    fn from(video: VideoInfo) -> Self {
        Self::Success {
            title: video.title,
            download_url: video.download_url,
        }
    }
}

impl ExtractionResult {
    pub fn exhausted() -> Self {
        Self::Failure {
            error: EXHAUSTED_MESSAGE.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireResult<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for ExtractionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Success {
                title,
                download_url,
            } => WireResult {
                success: true,
                title: Some(title),
                download_url: Some(download_url),
                error: None,
            },
            Self::Failure { error } => WireResult {
                success: false,
                title: None,
                download_url: None,
                error: Some(error),
            },
        };
        wire.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(title: Option<&str>, play: Option<&str>, hdplay: Option<&str>) -> ApiResponse {
        ApiResponse {
            code: Some(0),
            data: Some(VideoData {
                title: title.map(String::from),
                play: play.map(String::from),
                hdplay: hdplay.map(String::from),
            }),
        }
    }

    #[test]
    fn usable_requires_zero_code_and_play() {
        assert!(response(None, Some("https://cdn/x.mp4"), None).is_usable());
        assert!(!response(None, Some(""), None).is_usable());
        assert!(!response(None, None, Some("https://cdn/hd.mp4")).is_usable());

        let mut failed = response(None, Some("https://cdn/x.mp4"), None);
        failed.code = Some(-1);
        assert!(!failed.is_usable());

        assert!(!ApiResponse::default().is_usable());
    }

    #[test]
    fn hd_prefers_hdplay_when_present() {
        let video = response(Some("Cat"), Some("https://cdn/x.mp4"), Some("https://cdn/hd.mp4"))
            .into_video(Quality::Hd)
            .unwrap();
        assert_eq!(video.download_url, "https://cdn/hd.mp4");

        let video = response(Some("Cat"), Some("https://cdn/x.mp4"), Some("https://cdn/hd.mp4"))
            .into_video(Quality::Normal)
            .unwrap();
        assert_eq!(video.download_url, "https://cdn/x.mp4");

        let video = response(Some("Cat"), Some("https://cdn/x.mp4"), Some(""))
            .into_video(Quality::Hd)
            .unwrap();
        assert_eq!(video.download_url, "https://cdn/x.mp4");
    }

    #[test]
    fn long_title_is_cut_to_100_chars() {
        let long: String = "abcdefghij".repeat(25);
        let video = response(Some(&long), Some("https://cdn/x.mp4"), None)
            .into_video(Quality::Normal)
            .unwrap();
        assert_eq!(video.title.chars().count(), 100);
        assert!(long.starts_with(&video.title));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(150);
        let video = response(Some(&long), Some("https://cdn/x.mp4"), None)
            .into_video(Quality::Normal)
            .unwrap();
        assert_eq!(video.title, "é".repeat(100));
    }

    #[test]
    fn missing_title_uses_default() {
        let video = response(None, Some("https://cdn/x.mp4"), None)
            .into_video(Quality::Normal)
            .unwrap();
        assert_eq!(video.title, DEFAULT_TITLE);

        let video = response(Some(""), Some("https://cdn/x.mp4"), None)
            .into_video(Quality::Normal)
            .unwrap();
        assert_eq!(video.title, DEFAULT_TITLE);
    }

    #[test]
    fn result_serializes_with_success_flag() {
        let ok = ExtractionResult::Success {
            title: "Cat".to_string(),
            download_url: "https://cdn/x.mp4".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "title": "Cat", "downloadUrl": "https://cdn/x.mp4"})
        );

        assert_eq!(
            serde_json::to_value(ExtractionResult::exhausted()).unwrap(),
            serde_json::json!({"success": false, "error": EXHAUSTED_MESSAGE})
        );
    }

    #[test]
    fn quality_labels() {
        assert_eq!(Quality::Normal.to_string(), "Normal");
        assert_eq!(Quality::Hd.to_string(), "HD");
        assert_eq!(Quality::Normal.hd_flag(), "0");
        assert_eq!(Quality::Hd.hd_flag(), "1");
    }
}
