//! JSON bundle emitter.

use crate::bundle::EvidenceBundle;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Serialize the bundle to `<dir>/<file_stem>.json`, pretty-printed
/// UTF-8. Non-ASCII text is written as-is, not escaped, so feature and
/// scenario names stay readable in the file.
pub fn write_bundle(dir: &Path, file_stem: &str, bundle: &EvidenceBundle) -> Result<PathBuf> {
    let path = dir.join(format!("{file_stem}.json"));
    let json = serde_json::to_string_pretty(bundle).context("serialize evidence bundle")?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
