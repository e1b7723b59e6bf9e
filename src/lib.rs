//! Scenario evidence capture and report emission for BDD test runs.
//!
//! A test runner gives each worker an [`EvidenceRecorder`]. Step glue
//! registers API calls, database queries, and screenshots as they
//! happen; at scenario end the recorder writes either a machine-readable
//! JSON bundle or, when screenshots are present, a reviewable document
//! with the images embedded.
//!
//! ```no_run
//! use behavior_evidence::{ApiCall, EvidenceRecorder, OutputFormat};
//!
//! # fn run() -> anyhow::Result<()> {
//! let mut recorder = EvidenceRecorder::new("evidence")?;
//! recorder.start_scenario("Login", "Valid user")?;
//! recorder.add_api_request(ApiCall::new("GET", "https://api.example.test/session"));
//! let _saved = recorder.save_evidence(OutputFormat::Auto);
//! # Ok(())
//! # }
//! ```
//!
//! Evidence capture never fails the scenario it observes: save-time
//! problems are logged and reported as `None`, and only directory
//! creation at startup propagates an error.

pub mod assertions;
pub mod body;
pub mod bundle;
pub mod cli;
pub mod format;
pub mod locators;
pub mod logging;
pub mod recorder;
pub mod render;
pub mod sanitize;
pub mod settings;

pub use bundle::{ApiCall, ApiEvent, DbEvent, EvidenceBundle, Row, UiEvent};
pub use format::OutputFormat;
pub use recorder::EvidenceRecorder;
pub use settings::Settings;
