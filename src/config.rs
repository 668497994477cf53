use std::time::Duration;

use crate::cli::Args;
use crate::proxy::Proxy;

pub const DEFAULT_API_BASE: &str = "https://tikwm.com/api/";

/// Desktop browser identity sent to the relays.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Overall cap on a `--save` download.
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Settings shared by the resolver and the extraction client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relays to try, in order.
    pub proxies: Vec<Proxy>,
    pub api_base: String,
    pub user_agent: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxies: Proxy::ALL.to_vec(),
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_args(args: &Args) -> Self {
        let mut proxies = Vec::new();
        for proxy in &args.proxy {
            if !proxies.contains(proxy) {
                proxies.push(*proxy);
            }
        }
        if proxies.is_empty() {
            proxies = Proxy::ALL.to_vec();
        }

        let user_agent = if args.no_user_agent {
            None
        } else {
            Some(args.user_agent.clone())
        };

        Self {
            proxies,
            api_base: args.api_base.clone(),
            user_agent,
            timeout: Duration::from_secs(args.timeout),
        }
    }

    /// Headers attached to every extraction request.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        self.user_agent
            .iter()
            .map(|ua| ("User-Agent".to_string(), ua.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_use_every_proxy() {
        let args = Args::parse_from(["tiktok-dl", "https://www.tiktok.com/@a/video/1"]);
        let config = ClientConfig::from_args(&args);
        assert_eq!(config.proxies, Proxy::ALL.to_vec());
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.user_agent.as_deref(), Some(DEFAULT_USER_AGENT));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn proxy_selection_keeps_order_and_drops_duplicates() {
        let args = Args::parse_from([
            "tiktok-dl",
            "--proxy",
            "codetabs",
            "--proxy",
            "allorigins",
            "--proxy",
            "codetabs",
            "x",
        ]);
        let config = ClientConfig::from_args(&args);
        assert_eq!(config.proxies, vec![Proxy::Codetabs, Proxy::Allorigins]);
    }

    #[test]
    fn user_agent_can_be_disabled() {
        let args = Args::parse_from(["tiktok-dl", "--no-user-agent", "x"]);
        let config = ClientConfig::from_args(&args);
        assert!(config.user_agent.is_none());
        assert!(config.request_headers().is_empty());
    }
}
