use serde::{Deserialize, Serialize};

pub const SUPPORTED_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    pub version: String,
    /// Engine inputs files can be bound to, in matching priority order.
    #[serde(default)]
    pub slots: Vec<SlotDefinition>,
    /// Descend into subdirectories when listing the batch folder.
    #[serde(default)]
    pub recursive: bool,
    /// Include dot-files when listing the batch folder.
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION.to_string(),
            slots: Vec::new(),
            recursive: false,
            include_hidden: false,
            event_capacity: default_event_capacity(),
        }
    }
}

/// An execution-engine input and the content types it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDefinition {
    /// Engine-side identifier of the input.
    pub id: String,
    /// Kind of input, e.g. "image" or "video".
    pub slot_type: String,
    /// MIME globs such as "image/*" or "video/mp4".
    #[serde(default)]
    pub accept: Vec<String>,
}

impl SlotDefinition {
    pub fn new(id: impl Into<String>, slot_type: impl Into<String>, accept: &[&str]) -> Self {
        Self {
            id: id.into(),
            slot_type: slot_type.into(),
            accept: accept.iter().map(|a| a.to_string()).collect(),
        }
    }
}
