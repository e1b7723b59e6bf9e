//! YAML-driven element location.
//!
//! Pages keep their element locators in `<elements_dir>/<page>.yaml`,
//! with `common.yaml` as a shared fallback:
//!
//! ```yaml
//! login:
//!   username: {type: id, value: username}
//!   submit: {type: css, value: "button[type=submit]"}
//! ```
//!
//! Lookups are tolerant: a missing file or entry logs a warning and
//! returns `None`, so a typo in a step never panics the runner mid-suite.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One element locator as stored in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Locator {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

impl Locator {
    /// Compile the locator into a selector string for the browser layer.
    /// Unknown kinds pass the value through verbatim.
    pub fn selector(&self) -> String {
        match self.kind.to_ascii_lowercase().as_str() {
            "id" => format!("#{}", self.value),
            "class" => format!(".{}", self.value),
            "name" => format!("[name='{}']", self.value),
            _ => self.value.clone(),
        }
    }
}

pub struct LocatorRepository {
    base_dir: PathBuf,
}

impl LocatorRepository {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve `page.element` to a locator. The page file is consulted
    /// first; when it does not exist, `common.yaml` is tried, where the
    /// element may live either under the page key or at the top level.
    pub fn lookup(&self, page: &str, element: &str) -> Option<Locator> {
        let page_file = self.base_dir.join(format!("{page}.yaml"));
        let file = if page_file.exists() {
            page_file
        } else {
            self.base_dir.join("common.yaml")
        };
        if !file.exists() {
            warn!(file = %file.display(), "element locator file does not exist");
            return None;
        }

        let data = load_yaml(&file)?;
        let found = data
            .get(page)
            .and_then(|entries| entries.get(element))
            .or_else(|| data.get(element));
        let Some(node) = found else {
            warn!(page, element, "element locator not found");
            return None;
        };

        match serde_yaml::from_value::<Locator>(node.clone()) {
            Ok(locator) => {
                debug!(page, element, kind = %locator.kind, "element locator resolved");
                Some(locator)
            }
            Err(err) => {
                warn!(page, element, error = %err, "malformed element locator entry");
                None
            }
        }
    }

    /// Resolve `page.element` straight to a selector string.
    pub fn selector(&self, page: &str, element: &str) -> Option<String> {
        self.lookup(page, element).map(|locator| locator.selector())
    }
}

fn load_yaml(path: &Path) -> Option<serde_yaml::Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(file = %path.display(), error = %err, "failed to read locator file");
            return None;
        }
    };
    match serde_yaml::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(file = %path.display(), error = %err, "failed to parse locator file");
            None
        }
    }
}
