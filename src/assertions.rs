//! Chainable assertions over a recorded HTTP response.
//!
//! The HTTP client itself lives outside this crate; step glue hands a
//! [`ResponseSnapshot`] here for assertion and to the recorder for
//! evidence. Each assertion returns `&Self` on success so checks chain:
//!
//! ```no_run
//! # use behavior_evidence::assertions::{Assertions, ResponseSnapshot};
//! # fn check(snapshot: &ResponseSnapshot) -> Result<(), behavior_evidence::assertions::AssertionError> {
//! Assertions::new(snapshot)
//!     .assert_status(200)?
//!     .assert_header("content-type", Some("application/json"))?
//!     .assert_json("user.name", Some(serde_json::json!("amy")))?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

/// Immutable snapshot of one HTTP response, as captured by the client
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Raw body text; parsed lazily when a JSON assertion needs it.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: String,
}

impl ResponseSnapshot {
    /// Header lookup by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse the body as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Navigate the parsed body by a dotted key path (`"user.name"`).
    /// Returns `None` when the body is not JSON, a segment is missing,
    /// or the path descends into a non-object.
    pub fn json_value(&self, key: &str) -> Option<Value> {
        let mut current = self.json()?;
        for segment in key.split('.') {
            current = current.as_object()?.get(segment)?.clone();
        }
        Some(current)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AssertionError {
    #[error("status assertion failed: expected {expected:?}, actual {actual}")]
    Status { expected: Vec<u16>, actual: u16 },
    #[error("header does not exist: {name}")]
    HeaderMissing { name: String },
    #[error("header value mismatch: {name}: expected {expected}, actual {actual}")]
    HeaderMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("response is not JSON")]
    NotJson,
    #[error("json key does not exist: {key}")]
    JsonKeyMissing { key: String },
    #[error("json value mismatch: {key}: expected {expected}, actual {actual}")]
    JsonMismatch {
        key: String,
        expected: Value,
        actual: Value,
    },
    #[error("text assertion failed: expected to contain {expected:?}")]
    TextMismatch { expected: String },
    #[error("response is not successful: status {actual}")]
    NotSuccessful { actual: u16 },
    #[error("json shape check failed: missing keys {missing:?}")]
    MissingKeys { missing: Vec<String> },
}

#[derive(Debug)]
pub struct Assertions<'a> {
    response: &'a ResponseSnapshot,
}

impl<'a> Assertions<'a> {
    pub fn new(response: &'a ResponseSnapshot) -> Self {
        Self { response }
    }

    pub fn assert_status(&self, expected: u16) -> Result<&Self, AssertionError> {
        self.assert_status_in(&[expected])
    }

    pub fn assert_status_in(&self, expected: &[u16]) -> Result<&Self, AssertionError> {
        if !expected.contains(&self.response.status) {
            return Err(AssertionError::Status {
                expected: expected.to_vec(),
                actual: self.response.status,
            });
        }
        info!(status = self.response.status, "status assertion passed");
        Ok(self)
    }

    /// Assert a header exists; with `expected` set, also assert its value.
    pub fn assert_header(
        &self,
        name: &str,
        expected: Option<&str>,
    ) -> Result<&Self, AssertionError> {
        let actual = self.response.header(name);
        match (expected, actual) {
            (_, None) => {
                return Err(AssertionError::HeaderMissing {
                    name: name.to_string(),
                })
            }
            (Some(expected), Some(actual)) if expected != actual => {
                return Err(AssertionError::HeaderMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                })
            }
            _ => {}
        }
        info!(header = name, "header assertion passed");
        Ok(self)
    }

    /// Assert a dotted-path key exists in the JSON body; with `expected`
    /// set, also assert its value.
    pub fn assert_json(
        &self,
        key: &str,
        expected: Option<Value>,
    ) -> Result<&Self, AssertionError> {
        if self.response.json().is_none() {
            return Err(AssertionError::NotJson);
        }
        let Some(actual) = self.response.json_value(key) else {
            return Err(AssertionError::JsonKeyMissing {
                key: key.to_string(),
            });
        };
        if let Some(expected) = expected {
            if actual != expected {
                return Err(AssertionError::JsonMismatch {
                    key: key.to_string(),
                    expected,
                    actual,
                });
            }
        }
        info!(key, "json assertion passed");
        Ok(self)
    }

    /// Assert the body contains (or, with `exact`, equals) the text.
    pub fn assert_text(&self, expected: &str, exact: bool) -> Result<&Self, AssertionError> {
        let matched = if exact {
            self.response.body == expected
        } else {
            self.response.body.contains(expected)
        };
        if !matched {
            return Err(AssertionError::TextMismatch {
                expected: expected.to_string(),
            });
        }
        info!("text assertion passed");
        Ok(self)
    }

    /// Assert a 2xx status.
    pub fn assert_success(&self) -> Result<&Self, AssertionError> {
        if !self.response.is_success() {
            return Err(AssertionError::NotSuccessful {
                actual: self.response.status,
            });
        }
        info!("success assertion passed");
        Ok(self)
    }

    /// Shallow shape check: every named key must exist at the top level
    /// of the JSON body.
    pub fn assert_keys(&self, keys: &[&str]) -> Result<&Self, AssertionError> {
        let Some(Value::Object(map)) = self.response.json() else {
            return Err(AssertionError::NotJson);
        };
        let missing: Vec<String> = keys
            .iter()
            .filter(|key| !map.contains_key(**key))
            .map(|key| (*key).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AssertionError::MissingKeys { missing });
        }
        info!("json shape assertion passed");
        Ok(self)
    }
}
