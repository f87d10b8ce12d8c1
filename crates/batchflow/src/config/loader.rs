use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::{BatchConfig, SUPPORTED_VERSION};
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BatchConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<BatchConfig, ConfigError> {
    let config: BatchConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.event_capacity == 0 {
        return Err(ConfigError::Validation {
            message: "eventCapacity must be greater than 0".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for slot in &config.slots {
        if slot.id.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "Slot id cannot be empty".to_string(),
            });
        }

        if !seen.insert(slot.id.as_str()) {
            return Err(ConfigError::DuplicateSlot(slot.id.clone()));
        }

        for pattern in &slot.accept {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::InvalidSlotPattern {
                    slot: slot.id.clone(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(())
}
