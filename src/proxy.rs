use std::fmt;

/// Public CORS relays the extraction requests are routed through, in
/// their default order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Proxy {
    /// api.allorigins.win
    Allorigins,
    /// corsproxy.io
    Corsproxy,
    /// api.codetabs.com
    Codetabs,
}

/// How the relay should hand back the upstream body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relay {
    /// Upstream response passed through untouched.
    Raw,
    /// Upstream body wrapped in a JSON envelope where the relay supports it.
    Envelope,
}

impl Proxy {
    pub const ALL: [Proxy; 3] = [Proxy::Allorigins, Proxy::Corsproxy, Proxy::Codetabs];

    /// Build the relay URL that fetches `target` on our behalf.
    pub fn wrap(self, target: &str, relay: Relay) -> String {
        let encoded = urlencoding::encode(target);
        match (self, relay) {
            (Self::Allorigins, Relay::Envelope) => {
                format!("https://api.allorigins.win/get?url={encoded}")
            }
            (Self::Allorigins, Relay::Raw) => {
                format!("https://api.allorigins.win/raw?url={encoded}")
            }
            (Self::Corsproxy, _) => format!("https://corsproxy.io/?{encoded}"),
            (Self::Codetabs, _) => format!("https://api.codetabs.com/v1/proxy?quest={encoded}"),
        }
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allorigins => write!(f, "allorigins"),
            Self::Corsproxy => write!(f, "corsproxy"),
            Self::Codetabs => write!(f, "codetabs"),
        }
    }
}
