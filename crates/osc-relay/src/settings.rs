//! Host configuration store
//!
//! Settings are a flat JSON object. Values readable through
//! [`ConfigReader`] are either a single string or an array of strings; the
//! GUI server's `send` key accepts both forms:
//!
//! ```json
//! { "send": ["127.0.0.1:5555"], "port": 8080 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use crate::error::{RelayError, Result};
use crate::host::ConfigReader;

/// Key holding the list of `host:port` send targets
pub const SEND_KEY: &str = "send";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings with only the `send` targets populated
    pub fn with_send<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut settings = Self::new();
        settings.set(
            SEND_KEY,
            Value::Array(targets.into_iter().map(|t| Value::String(t.into())).collect()),
        );
        settings
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        debug!("Loaded settings from {}", path.display());
        Self::from_json_str(&contents)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

impl ConfigReader for Settings {
    /// Fails with [`RelayError::Settings`] if the key holds anything other
    /// than a string or a list of strings.
    fn read(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(RelayError::Settings(format!(
                        "'{}' entries must be strings, found {}",
                        key, other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(RelayError::Settings(format!(
                "'{}' must be a string or a list of strings, found {}",
                key, other
            ))),
        }
    }
}
