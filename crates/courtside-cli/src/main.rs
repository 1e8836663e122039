//! Courtside command-line binary.

mod args;
mod prompt;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use courtside_analyzer::{AnalysisError, AnalysisRequest, AnalyzerConfig, AssetPoller, CancelToken};
use courtside_gemini::GeminiClient;

use crate::args::{AnalyzeArgs, Cli, Command};
use crate::prompt::referee_prompt;

const EXIT_CONFIG: i32 = 1;

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Analyze(args) => run_analyze(args).await,
    };

    std::process::exit(code);
}

/// Colored output for dev, JSON for production. Logs go to stderr so the
/// report on stdout stays clean.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,courtside=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run_analyze(args: AnalyzeArgs) -> i32 {
    let (poller, request) = match build(&args) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Failed to configure analysis: {:#}", e);
            eprintln!("Configuration error: {:#}", e);
            return EXIT_CONFIG;
        }
    };

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, cancelling analysis");
            trigger.cancel();
        }
    });

    let result = poller.analyze_with_cancel(&request, &cancel).await;

    if args.remove_input {
        remove_input(&args.video).await;
    }

    match result {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize report: {}", e);
                        return EXIT_CONFIG;
                    }
                }
            } else {
                println!("{}", report.text);
            }
            0
        }
        Err(e) => {
            eprintln!("Analysis failed ({}): {}", e.kind(), e);
            exit_code(&e)
        }
    }
}

/// Assemble the poller and request from flags and environment.
fn build(args: &AnalyzeArgs) -> anyhow::Result<(AssetPoller, AnalysisRequest)> {
    let gemini = GeminiClient::from_env()
        .context("Gemini API key missing: set GEMINI_API_KEY in the environment or a .env file")?;

    let mut config = AnalyzerConfig::from_env();
    if let Some(secs) = args.poll_interval {
        anyhow::ensure!(
            secs.is_finite() && secs >= 0.0,
            "--poll-interval must be a non-negative number of seconds"
        );
        config.poll.poll_interval = Duration::from_secs_f64(secs);
    }
    if let Some(max_attempts) = args.max_attempts {
        config.poll.max_attempts = max_attempts;
    }
    info!(
        "Polling every {:?}, at most {} times ({:?} total)",
        config.poll.poll_interval,
        config.poll.max_attempts,
        config.poll.max_wait()
    );

    let prompt = match &args.prompt_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?,
        None => referee_prompt(&args.language),
    };

    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());

    let mut request = AnalysisRequest::new(&args.video, prompt, model);
    if let Some(media_type) = args.media_type {
        request = request.with_media_type(media_type);
    }

    let poller = AssetPoller::new(gemini, config.poll)?;
    Ok((poller, request))
}

async fn remove_input(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Distinct exit status per error kind.
fn exit_code(err: &AnalysisError) -> i32 {
    match err {
        AnalysisError::InvalidInput(_) => 2,
        AnalysisError::RemoteProcessing { .. } => 3,
        AnalysisError::Timeout { .. } => 4,
        AnalysisError::Generation(_) => 5,
        AnalysisError::Submission(_) | AnalysisError::StatusQuery { .. } => 6,
        AnalysisError::Cancelled => 130,
        AnalysisError::Config(_) => EXIT_CONFIG,
    }
}
