use std::fmt;

use crate::config::ClientConfig;
use crate::decode;
use crate::model::{ExtractionResult, Quality, VideoInfo};
use crate::proxy::{Proxy, Relay};
use crate::resolve::ResolvedUrl;
use crate::transport::{FetchRequest, Transport};

/// One relay + extraction API request to try
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub proxy: Proxy,
    /// Video URL handed to the extraction API.
    pub video_url: String,
    pub request_url: String,
    pub headers: Vec<(String, String)>,
}

/// Outcome of trying a single target
#[derive(Debug)]
pub enum Attempt {
    Accepted(VideoInfo),
    Skipped(SkipReason),
}

#[derive(Debug)]
pub enum SkipReason {
    Transport(anyhow::Error),
    Status(u16),
    Undecodable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "request failed: {e}"),
            Self::Status(status) => write!(f, "HTTP {status}"),
            Self::Undecodable => write!(f, "no usable response body"),
        }
    }
}

/// Extraction API URL for `video_url` at the requested quality.
pub fn api_url(api_base: &str, video_url: &str, quality: Quality) -> String {
    format!(
        "{api_base}?url={}&hd={}",
        urlencoding::encode(video_url),
        quality.hd_flag()
    )
}

/// Build the ordered list of targets: every relay against the resolved URL,
/// then, if resolution changed it, every relay against the URL as pasted.
pub fn build_targets(
    config: &ClientConfig,
    resolved: &ResolvedUrl,
    quality: Quality,
) -> Vec<FetchTarget> {
    let mut video_urls = vec![resolved.url.as_str()];
    if resolved.changed() {
        video_urls.push(resolved.original.as_str());
    }

    let headers = config.request_headers();
    let mut targets = Vec::new();

    for video_url in video_urls {
        let api = api_url(&config.api_base, video_url, quality);
        for &proxy in &config.proxies {
            targets.push(FetchTarget {
                proxy,
                video_url: video_url.to_string(),
                request_url: proxy.wrap(&api, Relay::Envelope),
                headers: headers.clone(),
            });
        }
    }

    targets
}

async fn try_target(transport: &dyn Transport, target: &FetchTarget, quality: Quality) -> Attempt {
    let request = FetchRequest::get(&target.request_url).with_headers(&target.headers);

    let reply = match transport.fetch(&request).await {
        Ok(reply) => reply,
        Err(e) => return Attempt::Skipped(SkipReason::Transport(e)),
    };
    if !reply.is_success() {
        return Attempt::Skipped(SkipReason::Status(reply.status));
    }

    match decode::decode_response(&reply.body).and_then(|r| r.into_video(quality)) {
        Some(video) => Attempt::Accepted(video),
        None => Attempt::Skipped(SkipReason::Undecodable),
    }
}

/// Try every target in order and return the first video found.
///
/// Never fails: exhausting the list yields [`ExtractionResult::Failure`].
pub async fn extract_video(
    transport: &dyn Transport,
    config: &ClientConfig,
    resolved: &ResolvedUrl,
    quality: Quality,
) -> ExtractionResult {
    let targets = build_targets(config, resolved, quality);

    for (i, target) in targets.iter().enumerate() {
        match try_target(transport, target, quality).await {
            Attempt::Accepted(video) => {
                tracing::info!(
                    "extracted via {} ({}/{}) for {}",
                    target.proxy,
                    i + 1,
                    targets.len(),
                    target.video_url
                );
                return video.into();
            }
            Attempt::Skipped(reason) => {
                tracing::debug!(
                    "skipping {} ({}/{}) for {}: {reason}",
                    target.proxy,
                    i + 1,
                    targets.len(),
                    target.video_url
                );
            }
        }
    }

    tracing::warn!("all {} extraction targets failed", targets.len());
    ExtractionResult::exhausted()
}
