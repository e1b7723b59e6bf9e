//! Evidence accumulation across one scenario.
//!
//! An [`EvidenceRecorder`] owns the bundle for exactly one scenario at a
//! time: `start_scenario` resets it, the `add_*` calls append events in
//! call order, and `save_evidence` writes the bundle out and discards it.
//! Runners that execute scenarios in parallel workers give each worker
//! its own recorder; there is no internal locking.
//!
//! Failure policy: evidence capture must never fail the test it is
//! recording. Only directory creation in the constructor and in
//! `start_scenario` propagates; everything that can go wrong while saving
//! is logged and surfaces as `None`.

use crate::bundle::{
    sortable_timestamp, ApiCall, ApiEvent, DbEvent, EvidenceBundle, Row, UiEvent,
};
use crate::format::{resolve, OutputFormat, Renderer};
use crate::render;
use crate::sanitize::sanitize_filename;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub struct EvidenceRecorder {
    evidence_root: PathBuf,
    docx_capable: bool,
    bundle: Option<EvidenceBundle>,
    screenshots_dir: Option<PathBuf>,
}

impl EvidenceRecorder {
    /// Create a recorder rooted at `evidence_root`, creating the
    /// directory if needed. Creation failure propagates; a runner that
    /// cannot write evidence at all should find out at startup.
    pub fn new(evidence_root: impl Into<PathBuf>) -> Result<Self> {
        let evidence_root = evidence_root.into();
        fs::create_dir_all(&evidence_root)
            .with_context(|| format!("create evidence root {}", evidence_root.display()))?;
        Ok(Self {
            evidence_root,
            docx_capable: render::DOCX_CAPABLE,
            bundle: None,
            screenshots_dir: None,
        })
    }

    /// Override the rich-render capability flag. The default follows the
    /// build (`docx` feature); tests inject `false` to exercise the
    /// capability-absent path.
    pub fn with_docx_capability(mut self, capable: bool) -> Self {
        self.docx_capable = capable;
        self
    }

    /// Scenario-scoped directory for transient screenshot files, if a
    /// scenario is active. The page-capture collaborator writes images
    /// here; the directory is deleted after a successful document save.
    pub fn screenshots_dir(&self) -> Option<&Path> {
        self.screenshots_dir.as_deref()
    }

    /// Begin collecting evidence for a new scenario, discarding any
    /// unsaved bundle from the previous one.
    pub fn start_scenario(&mut self, feature: &str, scenario: &str) -> Result<()> {
        let timestamp = sortable_timestamp();
        let dir_name = format!(
            "{}_{}_{}",
            sanitize_filename(feature),
            sanitize_filename(scenario),
            timestamp
        );
        let screenshots_dir = self.evidence_root.join("temp_screenshots").join(dir_name);
        fs::create_dir_all(&screenshots_dir)
            .with_context(|| format!("create screenshot dir {}", screenshots_dir.display()))?;

        self.bundle = Some(EvidenceBundle::new(feature, scenario, timestamp));
        self.screenshots_dir = Some(screenshots_dir);
        info!(scenario, "evidence collection started");
        Ok(())
    }

    /// Record one HTTP exchange. Bodies are normalized before storage;
    /// method and URL are stored as given, without validation.
    pub fn add_api_request(&mut self, call: ApiCall) {
        let Some(bundle) = self.bundle.as_mut() else {
            warn!("api request recorded outside a scenario; dropped");
            return;
        };
        debug!(method = %call.method, url = %call.url, "api request evidence added");
        bundle.api_requests.push(ApiEvent::from_call(call));
    }

    /// Record one database query. Exactly one of `result`/`error` is
    /// expected to be meaningful; if both are absent the event still
    /// records with a row count of zero. No SQL parsing or redaction.
    pub fn add_database_query(
        &mut self,
        query: &str,
        result: Option<Vec<Row>>,
        error: Option<String>,
    ) {
        let Some(bundle) = self.bundle.as_mut() else {
            warn!("database query recorded outside a scenario; dropped");
            return;
        };
        debug!(query, "database query evidence added");
        bundle.database_queries.push(DbEvent::new(query, result, error));
    }

    /// Record a screenshot reference. The file must exist by render
    /// time; it is not checked here.
    pub fn add_ui_screenshot(&mut self, path: &str, description: &str, page_url: &str) {
        let Some(bundle) = self.bundle.as_mut() else {
            warn!("screenshot recorded outside a scenario; dropped");
            return;
        };
        debug!(path, "screenshot evidence added");
        bundle.ui_screenshots.push(UiEvent::new(path, description, page_url));
    }

    /// Install an existing bundle, e.g. one parsed back from a saved
    /// JSON file, for re-rendering. No screenshot directory is attached.
    pub fn adopt_bundle(&mut self, bundle: EvidenceBundle) {
        self.bundle = Some(bundle);
        self.screenshots_dir = None;
    }

    /// Write the current bundle out and return the path, or `None` when
    /// there is no active bundle or the save fails. The bundle is
    /// discarded on success and retained on failure, so a caller may
    /// retry with a different format.
    pub fn save_evidence(&mut self, requested: OutputFormat) -> Option<PathBuf> {
        let bundle = self.bundle.as_ref()?;
        if bundle.scenario.is_empty() {
            return None;
        }

        let renderer = resolve(requested, bundle);
        if renderer == Renderer::Docx && !self.docx_capable {
            warn!("rich-document rendering unavailable in this build; evidence not saved");
            return None;
        }

        match self.write_bundle(renderer, bundle) {
            Ok(path) => {
                info!(path = %path.display(), "evidence saved");
                if renderer == Renderer::Docx {
                    self.cleanup_screenshots_dir();
                }
                self.bundle = None;
                Some(path)
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to save evidence");
                None
            }
        }
    }

    fn write_bundle(&self, renderer: Renderer, bundle: &EvidenceBundle) -> Result<PathBuf> {
        let safe_feature = sanitize_filename(&bundle.feature);
        let safe_scenario = sanitize_filename(&bundle.scenario);
        let feature_dir = self.evidence_root.join(&safe_feature);
        fs::create_dir_all(&feature_dir)
            .with_context(|| format!("create feature dir {}", feature_dir.display()))?;

        let file_stem = format!("{safe_feature}_{safe_scenario}_{}", bundle.timestamp);
        match renderer {
            Renderer::Json => render::json::write_bundle(&feature_dir, &file_stem, bundle),
            #[cfg(feature = "docx")]
            Renderer::Docx => render::docx::write_bundle(&feature_dir, &file_stem, bundle),
            #[cfg(not(feature = "docx"))]
            Renderer::Docx => anyhow::bail!("rich-document rendering not compiled in"),
        }
    }

    /// Best-effort removal of the scenario's transient screenshot files
    /// once they are embedded in a document.
    fn cleanup_screenshots_dir(&mut self) {
        let Some(dir) = self.screenshots_dir.take() else {
            return;
        };
        if let Err(err) = fs::remove_dir_all(&dir) {
            warn!(
                dir = %dir.display(),
                error = %err,
                "failed to clean up screenshot dir"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(dir: &Path) -> EvidenceRecorder {
        EvidenceRecorder::new(dir.join("evidence")).expect("create recorder")
    }

    #[test]
    fn save_before_start_returns_none_and_writes_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path());

        assert!(recorder.save_evidence(OutputFormat::Auto).is_none());

        let entries: Vec<_> = fs::read_dir(dir.path().join("evidence"))
            .expect("read evidence root")
            .collect();
        assert!(entries.is_empty(), "no files may be written");
    }

    #[test]
    fn start_scenario_creates_screenshot_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path());
        recorder
            .start_scenario("Login", "Valid user")
            .expect("start scenario");

        let screenshots = recorder.screenshots_dir().expect("screenshot dir set");
        assert!(screenshots.is_dir());
        assert!(screenshots
            .to_string_lossy()
            .contains("temp_screenshots"));
    }

    #[test]
    fn events_recorded_outside_a_scenario_are_dropped() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path());

        recorder.add_database_query("SELECT 1", None, None);
        recorder.add_ui_screenshot("shot.png", "", "");
        assert!(recorder.save_evidence(OutputFormat::Json).is_none());
    }

    #[test]
    fn api_events_save_as_json_in_call_order() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path());
        recorder
            .start_scenario("Users API", "Create user")
            .expect("start scenario");

        let mut first = ApiCall::new("POST", "https://api.example.test/users");
        first.body = Some(json!({"name": "amy"}));
        first.response_status = Some(201);
        recorder.add_api_request(first);
        recorder.add_api_request(ApiCall::new("GET", "https://api.example.test/users/7"));

        let path = recorder
            .save_evidence(OutputFormat::Auto)
            .expect("json evidence path");
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));

        let content = fs::read_to_string(&path).expect("read bundle");
        let parsed: EvidenceBundle = serde_json::from_str(&content).expect("parse bundle");
        assert_eq!(parsed.api_requests.len(), 2);
        assert_eq!(parsed.api_requests[0].request.method, "POST");
        assert_eq!(parsed.api_requests[1].request.method, "GET");
    }

    #[test]
    fn bundle_is_discarded_after_successful_save() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path());
        recorder
            .start_scenario("Feature", "Scenario")
            .expect("start scenario");
        recorder.add_database_query("SELECT 1", None, None);

        assert!(recorder.save_evidence(OutputFormat::Json).is_some());
        assert!(recorder.save_evidence(OutputFormat::Json).is_none());
    }

    #[test]
    fn empty_bundle_still_saves_as_json_under_auto() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path());
        recorder
            .start_scenario("Feature", "Scenario")
            .expect("start scenario");

        let path = recorder
            .save_evidence(OutputFormat::Auto)
            .expect("degenerate bundle path");
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    }

    #[test]
    fn screenshot_bundle_without_capability_returns_none_not_json() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path()).with_docx_capability(false);
        recorder
            .start_scenario("Login", "Valid user")
            .expect("start scenario");
        recorder.add_ui_screenshot("shot.png", "", "");

        assert!(recorder.save_evidence(OutputFormat::Auto).is_none());

        let feature_dir = dir.path().join("evidence").join("Login");
        assert!(!feature_dir.exists(), "no JSON fallback for screenshot bundles");
    }

    #[test]
    fn output_path_embeds_sanitized_names() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut recorder = recorder(dir.path());
        recorder
            .start_scenario("Login/Logout", "Bad: input?")
            .expect("start scenario");
        recorder.add_database_query("SELECT 1", None, None);

        let path = recorder
            .save_evidence(OutputFormat::Auto)
            .expect("evidence path");
        let name = path.file_name().and_then(|name| name.to_str()).expect("file name");
        assert!(name.starts_with("Login_Logout_Bad_ input_"));
        assert!(path.parent().unwrap().ends_with("Login_Logout"));
    }
}
