use thiserror::Error;

/// Errors that can occur while registering or delivering callbacks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A callback source refused the registration
    #[error("Failed to register callback with {source_name}: {reason}")]
    RegistrationFailed {
        source_name: &'static str,
        reason: String,
    },

    /// A callback source refused to drop the registration
    #[error("Failed to unregister callback from {source_name}: {reason}")]
    UnregistrationFailed {
        source_name: &'static str,
        reason: String,
    },

    /// The owning side of the event queue has been dropped
    #[error("Event channel has been closed")]
    ChannelClosed,
}

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;
