//! Callback events delivered by the profile collaborators

use sharing_state::{ConnectionState, DeviceId, Profile, ReceiveState, SourceId};

/// A profile connection transition of one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub device: DeviceId,
    pub profile: Profile,
    pub state: ConnectionState,
    /// Whether the connection was started from the UI
    pub user_triggered: bool,
}

impl ConnectionEvent {
    pub fn new(
        device: impl Into<DeviceId>,
        profile: Profile,
        state: ConnectionState,
        user_triggered: bool,
    ) -> Self {
        Self {
            device: device.into(),
            profile,
            state,
            user_triggered,
        }
    }

    pub fn connected(device: impl Into<DeviceId>, profile: Profile, user_triggered: bool) -> Self {
        Self::new(device, profile, ConnectionState::Connected, user_triggered)
    }

    pub fn disconnected(device: impl Into<DeviceId>, profile: Profile) -> Self {
        Self::new(device, profile, ConnectionState::Disconnected, false)
    }
}

/// Callbacks of the local broadcast source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastEvent {
    Started { reason: i32, broadcast_id: u32 },
    StartFailed { reason: i32 },
    Stopped { reason: i32, broadcast_id: u32 },
    StopFailed { reason: i32 },
    Updated { reason: i32, broadcast_id: u32 },
    MetadataChanged { broadcast_id: u32 },
    PlaybackStarted { reason: i32, broadcast_id: u32 },
    PlaybackStopped { reason: i32, broadcast_id: u32 },
}

/// Callbacks of the broadcast assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantEvent {
    SourceAdded {
        sink: DeviceId,
        source_id: SourceId,
        reason: i32,
    },
    SourceAddFailed {
        sink: DeviceId,
        reason: i32,
    },
    SourceRemoved {
        sink: DeviceId,
        source_id: SourceId,
        reason: i32,
    },
    ReceiveStateChanged {
        sink: DeviceId,
        source_id: SourceId,
        state: ReceiveState,
    },
}

/// Any event the sharing subsystem reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingEvent {
    Connection(ConnectionEvent),
    Broadcast(BroadcastEvent),
    Assistant(AssistantEvent),
}

impl From<ConnectionEvent> for SharingEvent {
    fn from(event: ConnectionEvent) -> Self {
        SharingEvent::Connection(event)
    }
}

impl From<BroadcastEvent> for SharingEvent {
    fn from(event: BroadcastEvent) -> Self {
        SharingEvent::Broadcast(event)
    }
}

impl From<AssistantEvent> for SharingEvent {
    fn from(event: AssistantEvent) -> Self {
        SharingEvent::Assistant(event)
    }
}
