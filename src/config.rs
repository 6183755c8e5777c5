use crate::errors::ArtifactError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where struct members start relative to the preceding variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StructAlignment {
    /// Members pack from the current cursor position, like any other variable
    #[default]
    Continue,
    /// A struct starts on a fresh slot and the variable after it does too
    SlotBoundary,
}

/// Layout options for an allocation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Slot boundary policy for struct variables
    pub struct_alignment: StructAlignment,
}

impl LayoutConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ArtifactError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config with the given struct policy.
    pub fn with_struct_alignment(mut self, struct_alignment: StructAlignment) -> Self {
        self.struct_alignment = struct_alignment;
        self
    }
}
