use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header;
use tokio::io::AsyncWriteExt;

/// Name used when neither the response nor the URL suggests one.
pub const FALLBACK_NAME: &str = "tiktok-video.mp4";

const PATH_HOSTILE: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Bytes kept from the start of the body to sniff for error pages.
const SNIFF_LEN: usize = 512;

/// Stream the video at `url` into `output_dir` and return the written path.
///
/// The body goes to a dot-prefixed temp file first. It is renamed into place
/// only once fully received and not an HTML page; on any failure after it
/// was created the temp file is removed.
pub async fn save_video(client: &reqwest::Client, url: &str, output_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let resp = client
        .get(url)
        .send()
        .await
        .context("failed to request video")?
        .error_for_status()?;

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type.contains("text/html") {
        return Err(anyhow!(
            "server returned HTML instead of a video (Content-Type: text/html)"
        ));
    }

    let filename = pick_filename(&resp);
    let dest = output_dir.join(&filename);
    let tmp = output_dir.join(format!(".{filename}.tmp"));

    let pb = ProgressBar::new(resp.content_length().unwrap_or(0));
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{bar:30.cyan/blue}] {bytes}/{total_bytes} {msg}",
    )?
    .progress_chars("=>-");
    pb.set_style(style);
    pb.set_message(filename.clone());

    let finished = match stream_to_file(resp, &tmp, &pb).await {
        Ok(head) if looks_like_html(&head) => Err(anyhow!(
            "downloaded file is HTML, not a video (possible redirect or error page)"
        )),
        Ok(_) => tokio::fs::rename(&tmp, &dest)
            .await
            .context("failed to move finished download into place"),
        Err(e) => Err(e),
    };

    if let Err(e) = finished {
        let _ = tokio::fs::remove_file(&tmp).await;
        pb.abandon_with_message(format!("FAIL: {filename}"));
        return Err(e);
    }

    pb.finish_with_message("done");
    Ok(dest)
}

/// Write the whole body to `path`, returning its first bytes.
async fn stream_to_file(resp: reqwest::Response, path: &Path, pb: &ProgressBar) -> Result<Vec<u8>> {
    let mut file = tokio::fs::File::create(path)
        .await
        .context("failed to create temp file")?;

    let mut head = Vec::with_capacity(SNIFF_LEN);
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("error reading response body")?;
        let wanted = SNIFF_LEN.saturating_sub(head.len()).min(chunk.len());
        head.extend_from_slice(&chunk[..wanted]);
        pb.inc(chunk.len() as u64);
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(head)
}

fn pick_filename(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|cd| cd.to_str().ok())
        .and_then(disposition_filename)
        .or_else(|| filename_from_url(resp.url().as_str()))
        .and_then(|name| safe_filename(&name))
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// File name from `Content-Disposition` parameters. An extended
/// `filename*=charset'lang'value` parameter beats a plain `filename`.
fn disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;

    for param in header.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                if let Some(name) = value.splitn(3, '\'').nth(2).and_then(percent_decoded) {
                    return Some(name);
                }
            }
            "filename" => {
                let name = value.trim_matches('"');
                if !name.is_empty() {
                    plain = Some(name.to_string());
                }
            }
            _ => {}
        }
    }

    plain
}

/// CDN paths are usually opaque tokens, so only trust segments that
/// already look like a video file.
fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let name = percent_decoded(parsed.path().rsplit('/').next()?)?;
    name.to_ascii_lowercase().ends_with(".mp4").then_some(name)
}

fn percent_decoded(raw: &str) -> Option<String> {
    urlencoding::decode(raw)
        .ok()
        .map(|s| s.into_owned())
        .filter(|s| !s.is_empty())
}

/// Replace characters that would escape or break the output directory.
/// Leading dots are dropped so a name can never collide with temp files.
fn safe_filename(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_control() || PATH_HOSTILE.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn looks_like_html(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start().to_ascii_lowercase();
    text.starts_with("<!doctype html") || text.starts_with("<html")
}
