use std::fmt;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::input::InputError;
use crate::model::{ExtractionResult, Quality};
use crate::pipeline::Report;

/// Status line shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Input(InputError),
    Fetching(Quality),
    Processed,
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "{e}"),
            Self::Fetching(quality) => write!(f, "Fetching {quality} quality video..."),
            Self::Processed => write!(f, "Video processed successfully!"),
            Self::Failed(message) => write!(f, "Error: {message}. Please try again."),
        }
    }
}

impl Status {
    /// Final status for a finished run.
    pub fn for_result(result: &ExtractionResult) -> Self {
        match result {
            ExtractionResult::Success { .. } => Self::Processed,
            ExtractionResult::Failure { error } => Self::Failed(error.clone()),
        }
    }
}

/// Spinner shown while a run is in flight.
pub fn spinner(status: &Status) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(status.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Human-readable rendering of a successful run.
pub fn render_report(report: &Report) -> Vec<String> {
    match &report.result {
        ExtractionResult::Success {
            title,
            download_url,
        } => vec![
            "Video Ready for Download!".to_string(),
            format!("  Title:    {title}"),
            format!("  Quality:  {}", report.quality),
            format!("  Download: {download_url}"),
        ],
        ExtractionResult::Failure { .. } => Vec::new(),
    }
}
