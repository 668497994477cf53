use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::decode;
use crate::proxy::{Proxy, Relay};
use crate::transport::{FetchRequest, Transport};

/// Candidate URL after canonicalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub original: String,
}

impl ResolvedUrl {
    fn unchanged(url: &str) -> Self {
        Self {
            url: url.to_string(),
            original: url.to_string(),
        }
    }

    fn expanded(url: String, original: &str) -> Self {
        Self {
            url,
            original: original.to_string(),
        }
    }

    pub fn changed(&self) -> bool {
        self.url != self.original
    }
}

/// Which dialect of TikTok link a URL is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `vm.tiktok.com` share links that redirect to the video page.
    Short,
    /// Links produced by the TikTok Lite app.
    Lite,
    Canonical,
}

impl LinkKind {
    pub fn classify(raw_url: &str) -> Self {
        let Ok(parsed) = Url::parse(raw_url) else {
            return Self::Canonical;
        };
        let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();

        match host.strip_prefix("www.").unwrap_or(&host) {
            "vm.tiktok.com" => Self::Short,
            "lite.tiktok.com" | "tiktoklite.com" => Self::Lite,
            _ => Self::Canonical,
        }
    }
}

static SCRIPT_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:window\.)?location(?:\.href)?\s*=\s*["']([^"']+)["']|location\.replace\(\s*["']([^"']+)["']\s*\)"#,
    )
    .expect("valid regex")
});

/// Resolve a short or app-specific TikTok link to its canonical form.
///
/// Never fails: anything that goes wrong along the way is logged and the
/// candidate is handed back as-is, since extraction retries the original
/// URL anyway.
pub async fn resolve_url(transport: &dyn Transport, raw_url: &str) -> ResolvedUrl {
    let resolved = match LinkKind::classify(raw_url) {
        LinkKind::Short => resolve_short_link(transport, raw_url).await,
        LinkKind::Lite => resolve_lite_link(transport, raw_url).await,
        LinkKind::Canonical => return ResolvedUrl::unchanged(raw_url),
    };

    match resolved {
        Ok(url) => {
            tracing::info!("resolved {raw_url} -> {url}");
            ResolvedUrl::expanded(url, raw_url)
        }
        Err(e) => {
            tracing::warn!("could not resolve {raw_url}, using it as-is: {e}");
            ResolvedUrl::unchanged(raw_url)
        }
    }
}

async fn resolve_short_link(transport: &dyn Transport, raw_url: &str) -> Result<String> {
    for proxy in Proxy::ALL {
        let request = FetchRequest::head(proxy.wrap(raw_url, Relay::Raw));
        match transport.fetch(&request).await {
            Ok(reply) if is_expanded(&reply.final_url) => return Ok(reply.final_url),
            Ok(reply) => {
                tracing::debug!("{proxy} did not expand {raw_url} (ended at {})", reply.final_url);
            }
            Err(e) => tracing::debug!("{proxy} redirect lookup failed for {raw_url}: {e}"),
        }
    }

    tracing::debug!("no redirect expanded {raw_url}, inspecting its HTML");
    let html = fetch_html(transport, raw_url).await?;
    find_canonical_in_html(&html)
        .ok_or_else(|| anyhow!("no canonical, og:url or refresh target in page"))
}

async fn resolve_lite_link(transport: &dyn Transport, raw_url: &str) -> Result<String> {
    let html = fetch_html(transport, raw_url).await?;
    find_lite_target_in_html(&html)
        .ok_or_else(|| anyhow!("no canonical link or script redirect in page"))
}

fn is_expanded(final_url: &str) -> bool {
    final_url.contains("tiktok.com") && !final_url.contains("vm.tiktok.com")
}

async fn fetch_html(transport: &dyn Transport, raw_url: &str) -> Result<String> {
    let request = FetchRequest::get(Proxy::Allorigins.wrap(raw_url, Relay::Envelope));
    let reply = transport.fetch(&request).await?;
    if !reply.is_success() {
        return Err(anyhow!("page fetch returned HTTP {}", reply.status));
    }
    Ok(decode::unwrap_html(&reply.body))
}

/// Look for the canonical video URL in a short link's landing page:
/// `<link rel="canonical">`, then `og:url`, then a meta refresh target.
fn find_canonical_in_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    select_attr(&document, r#"link[rel="canonical"]"#, "href")
        .into_iter()
        .chain(select_attr(&document, r#"meta[property="og:url"]"#, "content"))
        .chain(refresh_targets(&document))
        .find(|url| is_tiktok_https(url))
}

fn refresh_targets(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("meta[http-equiv][content]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"))
        })
        .filter_map(|element| element.value().attr("content"))
        .filter_map(refresh_target)
        .collect()
}

/// Lite pages point at the full site through a canonical link or a script
/// that reassigns `location`.
fn find_lite_target_in_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    if let Some(href) = select_attr(&document, r#"link[rel="canonical"]"#, "href")
        .into_iter()
        .find(|href| href.contains("tiktok.com"))
    {
        return Some(href);
    }

    SCRIPT_REDIRECT
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .find(|target| target.contains("tiktok.com"))
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .collect()
}

/// Pull the URL out of a refresh directive such as `0; url=https://...`.
fn refresh_target(content: &str) -> Option<String> {
    let lower = content.to_ascii_lowercase();
    let pos = lower.find("url=")?;
    let target = content[pos + 4..].trim().trim_matches(|c| c == '"' || c == '\'');
    Some(target.to_string())
}

fn is_tiktok_https(url: &str) -> bool {
    url.starts_with("https://") && url.contains("tiktok.com")
}
