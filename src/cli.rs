//! CLI argument parsing for saved-evidence tooling.
//!
//! The CLI is intentionally thin: it reads bundles back and routes them
//! through the same selector and emitters the recorder uses, so nothing
//! here embeds policy of its own.
use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for evidence-bundle tooling.
#[derive(Parser, Debug)]
#[command(
    name = "bevd",
    version,
    about = "Evidence bundle tooling for BDD test runs",
    after_help = "Commands:\n  inspect --bundle <file>             Summarize a saved evidence bundle\n  render --bundle <file>              Re-emit a bundle through the renderers\n\nExamples:\n  bevd inspect --bundle evidence/Login/Login_Valid_user_20260807_120000.json\n  bevd inspect --bundle bundle.json --json\n  bevd render --bundle bundle.json --evidence-dir evidence --format docx",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Inspect(InspectArgs),
    Render(RenderArgs),
}

/// Inspect command inputs for a single saved bundle.
#[derive(Parser, Debug)]
#[command(about = "Summarize a saved evidence bundle")]
pub struct InspectArgs {
    /// Path to a saved evidence bundle (JSON)
    #[arg(long, value_name = "FILE")]
    pub bundle: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Render command inputs used to re-emit a saved bundle.
#[derive(Parser, Debug)]
#[command(about = "Re-render a saved evidence bundle")]
pub struct RenderArgs {
    /// Path to a saved evidence bundle (JSON)
    #[arg(long, value_name = "FILE")]
    pub bundle: PathBuf,

    /// Evidence root directory to write into
    #[arg(long, value_name = "DIR", default_value = "evidence")]
    pub evidence_dir: PathBuf,

    /// Output format: auto, json, or docx
    #[arg(long, default_value = "auto", value_parser = parse_format)]
    pub format: OutputFormat,
}

fn parse_format(input: &str) -> Result<OutputFormat, String> {
    input.parse()
}
