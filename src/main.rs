use anyhow::{bail, Context, Result};
use behavior_evidence::cli::{Command, InspectArgs, RenderArgs, RootArgs};
use behavior_evidence::{EvidenceBundle, EvidenceRecorder, Settings};
use clap::Parser;
use serde::Serialize;
use std::path::Path;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    let settings = Settings::from_env();
    behavior_evidence::logging::init(&settings.log_level);

    match args.command {
        Command::Inspect(args) => cmd_inspect(&args),
        Command::Render(args) => cmd_render(&args),
    }
}

#[derive(Serialize)]
struct BundleSummary {
    feature: String,
    scenario: String,
    timestamp: String,
    api_requests: usize,
    database_queries: usize,
    ui_screenshots: usize,
}

impl BundleSummary {
    fn from_bundle(bundle: &EvidenceBundle) -> Self {
        Self {
            feature: bundle.feature.clone(),
            scenario: bundle.scenario.clone(),
            timestamp: bundle.timestamp.clone(),
            api_requests: bundle.api_requests.len(),
            database_queries: bundle.database_queries.len(),
            ui_screenshots: bundle.ui_screenshots.len(),
        }
    }
}

fn cmd_inspect(args: &InspectArgs) -> Result<()> {
    let bundle = read_bundle(&args.bundle)?;
    let summary = BundleSummary::from_bundle(&bundle);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Feature:          {}", summary.feature);
    println!("Scenario:         {}", summary.scenario);
    println!("Timestamp:        {}", summary.timestamp);
    println!("API requests:     {}", summary.api_requests);
    println!("Database queries: {}", summary.database_queries);
    println!("UI screenshots:   {}", summary.ui_screenshots);
    Ok(())
}

fn cmd_render(args: &RenderArgs) -> Result<()> {
    let bundle = read_bundle(&args.bundle)?;

    let mut recorder = EvidenceRecorder::new(&args.evidence_dir)?;
    recorder.adopt_bundle(bundle);

    let Some(path) = recorder.save_evidence(args.format) else {
        bail!("no evidence output produced");
    };
    println!("Wrote evidence to {}", path.display());
    Ok(())
}

fn read_bundle(path: &Path) -> Result<EvidenceBundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read bundle {}", path.display()))?;
    let bundle = serde_json::from_str(&content)
        .with_context(|| format!("parse bundle {}", path.display()))?;
    Ok(bundle)
}
