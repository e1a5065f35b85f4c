//! Signature — the declarative list of pin tags an agent is built from.

use crate::error::{PinError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declared input, output and signal tags. Absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub signals: Vec<String>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn outputs<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn signals<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signals = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Reject duplicate tags within any one field.
    ///
    /// The same tag may appear as both an input and an output.
    pub fn validate(&self) -> Result<()> {
        for tags in [&self.inputs, &self.outputs, &self.signals] {
            let mut seen = HashSet::new();
            for tag in tags {
                if !seen.insert(tag.as_str()) {
                    return Err(PinError::duplicate_tag(tag.clone()));
                }
            }
        }
        Ok(())
    }
}
