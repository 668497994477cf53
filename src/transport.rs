use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{ClientConfig, DOWNLOAD_TIMEOUT_SECS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
}

/// One outbound request issued through a relay
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: Method::Head,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }
}

/// What came back, after redirects were followed.
#[derive(Debug, Clone)]
pub struct FetchReply {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

impl FetchReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Every network request the resolver and the extraction client make goes
/// through this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchReply>;
}

/// `reqwest`-backed transport used by the binary.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

pub fn build_client(config: &ClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(config.timeout)
        .cookie_store(true)
        .build()
        .context("failed to build HTTP client")
}

/// Client for `--save`. Video bodies take far longer than API calls, so
/// the per-request timeout of [`ClientConfig`] does not apply here.
pub fn build_download_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .cookie_store(true)
        .build()
        .context("failed to build download client")
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchReply> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())
                    .with_context(|| format!("invalid header name {name}"))?,
                HeaderValue::from_str(value)
                    .with_context(|| format!("invalid value for header {name}"))?,
            );
        }

        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Head => self.client.head(&request.url),
        };

        let resp = builder.headers(headers).send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();

        let body = match request.method {
            Method::Head => String::new(),
            Method::Get => resp.text().await.context("failed to read response body")?,
        };

        Ok(FetchReply {
            status,
            final_url,
            body,
        })
    }
}
