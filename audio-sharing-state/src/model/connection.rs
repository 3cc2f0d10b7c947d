//! Profile and connection-state types

use serde::{Deserialize, Serialize};

/// Bluetooth profiles a remote device can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profile {
    LeAudio,
    A2dp,
    HeadsetHfp,
    Hearing,
    Other(u8),
}

/// Connection state of a single profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Per-profile status as reported by the device registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStatus {
    pub profile: Profile,
    /// Whether the user has left this profile enabled for the device
    pub enabled: bool,
    pub state: ConnectionState,
}

impl ProfileStatus {
    pub fn new(profile: Profile, state: ConnectionState) -> Self {
        Self {
            profile,
            enabled: true,
            state,
        }
    }

    pub fn connected(profile: Profile) -> Self {
        Self::new(profile, ConnectionState::Connected)
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
