//! Error types for sharing-state

use std::fmt;

use crate::model::DeviceId;

/// Result type for sharing-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors reported by the profile collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A profile proxy has not been bound yet
    ProfileUnavailable(&'static str),

    /// The device registry does not know the device
    DeviceNotFound(DeviceId),

    /// A platform action (set active, start/stop broadcast, add/remove source) failed
    ActionFailed(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::ProfileUnavailable(name) => write!(f, "Profile unavailable: {}", name),
            StateError::DeviceNotFound(id) => write!(f, "Device not found: {}", id),
            StateError::ActionFailed(msg) => write!(f, "Action failed: {}", msg),
        }
    }
}

impl std::error::Error for StateError {}
