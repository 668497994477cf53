use clap::Parser;

use crate::config::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::model::Quality;
use crate::proxy::Proxy;

/// Resolve a TikTok link to a direct video download URL
#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    /// TikTok link, or any text containing one (read from stdin when omitted)
    pub text: Vec<String>,

    /// Prefer the HD video asset
    #[arg(long)]
    pub hd: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Also download the video
    #[arg(long)]
    pub save: bool,

    /// Output directory for --save
    #[arg(short, long, default_value = ".", env = "TIKTOK_DL_OUTPUT")]
    pub output: String,

    /// Relay to route requests through; repeat to set the order (default: all)
    #[arg(long, value_enum)]
    pub proxy: Vec<Proxy>,

    /// Extraction API endpoint
    #[arg(long, default_value = DEFAULT_API_BASE, env = "TIKTOK_DL_API_BASE")]
    pub api_base: String,

    /// User-Agent sent with extraction requests
    #[arg(long, default_value = DEFAULT_USER_AGENT, env = "TIKTOK_DL_USER_AGENT")]
    pub user_agent: String,

    /// Send no User-Agent override
    #[arg(long)]
    pub no_user_agent: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "TIKTOK_DL_TIMEOUT")]
    pub timeout: u64,
}

impl Args {
    pub fn quality(&self) -> Quality {
        if self.hd { Quality::Hd } else { Quality::Normal }
    }

    /// Positional words joined back into the pasted text, if any were given.
    pub fn input_text(&self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.join(" "))
        }
    }
}
