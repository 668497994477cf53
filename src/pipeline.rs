use crate::config::ClientConfig;
use crate::extract;
use crate::input::{self, InputError};
use crate::model::{ExtractionResult, Quality};
use crate::resolve;
use crate::transport::Transport;

/// Everything one run produced, for the presentation layer to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Link as cleaned out of the input text.
    pub url: String,
    pub quality: Quality,
    pub result: ExtractionResult,
}

/// Normalize, resolve and extract. Input problems are reported before any
/// request is sent; every later failure ends up inside the report's result.
#[allow(dead_code)]
pub async fn process(
    transport: &dyn Transport,
    config: &ClientConfig,
    raw: &str,
    quality: Quality,
) -> Result<Report, InputError> {
    let url = input::normalize_input(raw)?;
    Ok(process_candidate(transport, config, url, quality).await)
}

/// Resolve and extract a link that already passed [`input::normalize_input`].
pub async fn process_candidate(
    transport: &dyn Transport,
    config: &ClientConfig,
    url: String,
    quality: Quality,
) -> Report {
    let resolved = resolve::resolve_url(transport, &url).await;
    let result = extract::extract_video(transport, config, &resolved, quality).await;

    Report {
        url,
        quality,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_API_BASE;
    use crate::extract::api_url;
    use crate::model::EXHAUSTED_MESSAGE;
    use crate::proxy::{Proxy, Relay};
    use crate::transport::testing::ScriptedTransport;

    fn api(proxy: Proxy, video_url: &str, quality: Quality) -> String {
        proxy.wrap(&api_url(DEFAULT_API_BASE, video_url, quality), Relay::Envelope)
    }

    #[tokio::test]
    async fn plain_url_succeeds_on_first_proxy() {
        let url = "https://www.tiktok.com/@user/video/123";
        let transport = ScriptedTransport::new().on_get(
            api(Proxy::Allorigins, url, Quality::Normal),
            200,
            r#"{"code":0,"data":{"title":"Cat","play":"https://cdn/x.mp4"}}"#,
        );

        let report = process(&transport, &ClientConfig::default(), url, Quality::Normal)
            .await
            .unwrap();
        assert_eq!(report.url, url);
        assert_eq!(
            report.result,
            ExtractionResult::Success {
                title: "Cat".to_string(),
                download_url: "https://cdn/x.mp4".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn input_errors_issue_no_requests() {
        let transport = ScriptedTransport::new();
        let config = ClientConfig::default();

        assert_eq!(
            process(&transport, &config, "", Quality::Normal).await,
            Err(InputError::Empty)
        );
        assert_eq!(
            process(&transport, &config, "not a url", Quality::Hd).await,
            Err(InputError::InvalidUrl)
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_short_link_extracts_from_original() {
        let short = "https://vm.tiktok.com/ZMabc123/";
        // Redirect lookups and page inspection are unscripted and fail; the
        // first relay for the original URL is down too.
        let transport = ScriptedTransport::new()
            .on_get(api(Proxy::Allorigins, short, Quality::Normal), 502, "")
            .on_get(
                api(Proxy::Corsproxy, short, Quality::Normal),
                200,
                r#"{"code":0,"data":{"title":"Dog","play":"https://cdn/dog.mp4"}}"#,
            );

        let text = format!("Look at this {short} #fyp");
        let report = process(&transport, &ClientConfig::default(), &text, Quality::Normal)
            .await
            .unwrap();

        assert_eq!(report.url, short);
        assert_eq!(
            report.result,
            ExtractionResult::Success {
                title: "Dog".to_string(),
                download_url: "https://cdn/dog.mp4".to_string(),
            }
        );
        // 3 redirect lookups, 1 page fetch, then two extraction attempts.
        assert_eq!(transport.requests().len(), 6);
    }

    #[tokio::test]
    async fn resolved_short_link_retries_original_after_resolved_chain() {
        let short = "https://vm.tiktok.com/ZMabc123/";
        let full = "https://www.tiktok.com/@user/video/777";
        let transport = ScriptedTransport::new()
            .on_head(Proxy::Allorigins.wrap(short, Relay::Raw), full)
            .on_get(
                api(Proxy::Allorigins, short, Quality::Hd),
                200,
                r#"{"code":0,"data":{"play":"https://cdn/sd.mp4","hdplay":"https://cdn/hd.mp4"}}"#,
            );

        let report = process(&transport, &ClientConfig::default(), short, Quality::Hd)
            .await
            .unwrap();
        assert_eq!(
            report.result,
            ExtractionResult::Success {
                title: "TikTok Video".to_string(),
                download_url: "https://cdn/hd.mp4".to_string(),
            }
        );

        let urls = transport.urls();
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[1], api(Proxy::Allorigins, full, Quality::Hd));
        assert_eq!(urls[4], api(Proxy::Allorigins, short, Quality::Hd));
    }

    #[tokio::test]
    async fn candidate_is_resolved_and_extracted_as_given() {
        let url = "https://vt.tiktok.com/ZS1abc/".to_string();
        let transport = ScriptedTransport::new().on_get(
            api(Proxy::Allorigins, &url, Quality::Normal),
            200,
            r#"{"code":0,"data":{"title":"Bird","play":"https://cdn/bird.mp4"}}"#,
        );

        let report =
            process_candidate(&transport, &ClientConfig::default(), url.clone(), Quality::Normal)
                .await;
        assert_eq!(report.url, url);
        assert!(report.result.is_success());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn exhaustion_is_reported_in_result() {
        let url = "https://m.tiktok.com/v/123.html";
        let transport = ScriptedTransport::new()
            .on_get(api(Proxy::Allorigins, url, Quality::Normal), 500, "")
            .on_get(api(Proxy::Corsproxy, url, Quality::Normal), 500, "")
            .on_get(api(Proxy::Codetabs, url, Quality::Normal), 500, "");

        let report = process(&transport, &ClientConfig::default(), url, Quality::Normal)
            .await
            .unwrap();
        assert_eq!(
            report.result,
            ExtractionResult::Failure {
                error: EXHAUSTED_MESSAGE.to_string()
            }
        );
    }
}
