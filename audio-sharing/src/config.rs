//! Configuration for the audio sharing handler

use serde::{Deserialize, Serialize};

use crate::error::{Result, SharingError};

/// Tunables of the connection arbitration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    /// Maximum number of sink groups in one shared session
    /// Default: 2
    pub max_sharing_groups: usize,

    /// Add the broadcast to a newly connected device when another member
    /// of its group already receives it
    /// Default: true
    pub auto_join_group_members: bool,

    /// Skip sharing dialogs and just activate the device during a call
    /// Default: true
    pub respect_call_state: bool,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            max_sharing_groups: 2,
            auto_join_group_members: true,
            respect_call_state: true,
        }
    }
}

impl SharingConfig {
    /// Create a SharingConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SharingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_sharing_groups(mut self, max: usize) -> Self {
        self.max_sharing_groups = max;
        self
    }

    pub fn with_auto_join_group_members(mut self, enabled: bool) -> Self {
        self.auto_join_group_members = enabled;
        self
    }

    pub fn with_respect_call_state(mut self, enabled: bool) -> Self {
        self.respect_call_state = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_sharing_groups == 0 {
            return Err(SharingError::Config(
                "max_sharing_groups must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
