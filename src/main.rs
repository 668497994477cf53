mod cli;
mod config;
mod decode;
mod download;
mod extract;
mod input;
mod model;
mod pipeline;
mod proxy;
mod resolve;
mod status;
mod transport;

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;

use crate::cli::Args;
use crate::config::ClientConfig;
use crate::model::ExtractionResult;
use crate::status::Status;
use crate::transport::{HttpTransport, build_download_client};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
                .add_directive("reqwest=warn".parse()?)
                .add_directive("hyper_util=warn".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = ClientConfig::from_args(&args);
    let transport = HttpTransport::new(&config)?;
    let quality = args.quality();

    let raw = match args.input_text() {
        Some(text) => text,
        None => read_stdin().await?,
    };

    // Bad input is reported before anything is shown as in flight
    let url = match input::normalize_input(&raw) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("{}", Status::Input(e));
            return Ok(ExitCode::from(2));
        }
    };

    let pb = status::spinner(&Status::Fetching(quality));
    let report = pipeline::process_candidate(&transport, &config, url, quality).await;
    pb.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.result)?);
    } else {
        let status = Status::for_result(&report.result);
        if report.result.is_success() {
            println!("{status}");
            for line in status::render_report(&report) {
                println!("{line}");
            }
        } else {
            eprintln!("{status}");
        }
    }

    let ExtractionResult::Success { download_url, .. } = &report.result else {
        return Ok(ExitCode::FAILURE);
    };

    if args.save {
        let client = build_download_client()?;
        let output_dir = Path::new(&args.output);
        match download::save_video(&client, download_url, output_dir).await {
            Ok(path) => {
                tracing::info!("saved {} to {}", report.url, path.display());
                if !args.json {
                    println!("  Saved:    {}", path.display());
                }
            }
            Err(e) => {
                tracing::error!("download failed for {download_url}: {e:#}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Pasted text from a pipe. An interactive terminal counts as empty input.
async fn read_stdin() -> Result<String> {
    if std::io::stdin().is_terminal() {
        return Ok(String::new());
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("failed to read input from stdin")?;
    Ok(text)
}
