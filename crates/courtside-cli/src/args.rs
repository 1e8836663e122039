//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use courtside_models::{MediaType, ReportModel};

use crate::prompt::DEFAULT_LANGUAGE;

#[derive(Debug, Parser)]
#[command(name = "courtside", version, about = "Referee analysis for basketball clips")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a clip, wait for processing and print the referee report
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Local video file (mp4 or mov)
    pub video: PathBuf,

    /// Model id, or `flash` / `pro` (default: GEMINI_MODEL or gemini-2.5-flash)
    #[arg(long)]
    pub model: Option<ReportModel>,

    /// Override the content type inferred from the file extension
    #[arg(long)]
    pub media_type: Option<MediaType>,

    /// Read the prompt from a file instead of the built-in referee prompt
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Language of the built-in prompt's answer
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Seconds between status queries (default: COURTSIDE_POLL_INTERVAL_SECS or 5)
    #[arg(long)]
    pub poll_interval: Option<f64>,

    /// Status queries before giving up (default: COURTSIDE_POLL_MAX_ATTEMPTS or 60)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delete the local video once the analysis finishes
    #[arg(long)]
    pub remove_input: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}
