use thiserror::Error;

/// Errors surfaced by the audio sharing handler
#[derive(Error, Debug)]
pub enum SharingError {
    #[error("State error: {0}")]
    State(#[from] sharing_state::StateError),

    #[error("Event error: {0}")]
    Events(#[from] sharing_events::EventError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type for audio sharing operations
pub type Result<T> = std::result::Result<T, SharingError>;
