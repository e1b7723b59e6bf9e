//! Runtime settings sourced from the process environment.
//!
//! Every knob has a default, so a bare environment yields a working
//! configuration. The struct serializes for diagnostics output.

use serde::Serialize;
use std::env;

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Base URL the UI layer navigates against.
    pub base_url: String,
    /// Base URL the API layer requests against.
    pub api_base_url: String,
    /// Root directory for saved evidence bundles.
    pub evidence_dir: String,
    /// Directory holding YAML element-locator files.
    pub elements_dir: String,
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,
    pub screenshot: ScreenshotSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenshotSettings {
    pub on_failure: bool,
    pub on_success: bool,
    pub directory: String,
    pub full_page: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_base_url: String::new(),
            evidence_dir: "evidence".to_string(),
            elements_dir: "data/elements".to_string(),
            log_level: "info".to_string(),
            screenshot: ScreenshotSettings {
                on_failure: true,
                on_success: false,
                directory: "screenshots".to_string(),
                full_page: false,
            },
        }
    }
}

impl Settings {
    /// Read settings from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_or("BASE_URL", &defaults.base_url),
            api_base_url: env_or("API_BASE_URL", &defaults.api_base_url),
            evidence_dir: env_or("EVIDENCE_DIR", &defaults.evidence_dir),
            elements_dir: env_or("ELEMENTS_DIR", &defaults.elements_dir),
            log_level: env_or("LOG_LEVEL", &defaults.log_level),
            screenshot: ScreenshotSettings {
                on_failure: env_flag("SCREENSHOT_ON_FAILURE", defaults.screenshot.on_failure),
                on_success: env_flag("SCREENSHOT_ON_SUCCESS", defaults.screenshot.on_success),
                directory: env_or("SCREENSHOT_DIR", &defaults.screenshot.directory),
                full_page: env_flag("SCREENSHOT_FULL_PAGE", defaults.screenshot.full_page),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.eq_ignore_ascii_case("true") || value == "1",
        Err(_) => default,
    }
}
