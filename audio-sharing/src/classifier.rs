//! Connection event classification
//!
//! Turns a raw connection callback, plus the current device snapshot, into
//! the small value the arbitrator decides on. All capability and
//! first-profile checks live here.

use std::sync::Arc;

use sharing_events::ConnectionEvent;
use sharing_state::{
    CallState, ConnectedGroups, ConnectionState, Device, DeviceId, DeviceItem,
    DeviceSnapshotProvider, GroupId, SharingSession,
};

/// What a device can do with respect to sharing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCapability {
    /// Cannot receive a broadcast (classic audio, or LE Audio without a group)
    Classic,
    /// LE Audio device with a valid group id
    LeAudio,
}

/// Normalized view of one connection, as seen by the arbitrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub device_id: DeviceId,
    pub device_name: String,
    /// `GroupId::INVALID` for classic devices
    pub group_id: GroupId,
    pub capability: DeviceCapability,
    pub user_triggered: bool,
    /// Whether this transition is the one that brought the device up
    pub first_connection: bool,
    /// Whether the device snapshot could be taken at all
    pub snapshot_ready: bool,
    pub in_call: bool,
    /// Distinct connected LE Audio groups, including this device's
    pub connected_group_count: usize,
    /// Connected LE Audio groups other than this device's
    pub other_groups: Vec<DeviceItem>,
    /// Sharing groups other than this device's
    pub other_sharing_groups: Vec<DeviceItem>,
}

impl Classification {
    pub fn is_le_audio(&self) -> bool {
        self.capability == DeviceCapability::LeAudio
    }
}

/// Outcome of looking at a raw connection event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionKind {
    /// A profile reached Connected on a connected device
    Connected {
        device: Device,
        user_triggered: bool,
        first_connection: bool,
    },
    /// The device went away; any dialog about it is stale
    Disconnected(DisconnectedDevice),
    /// Not relevant to arbitration
    Ignored(&'static str),
}

/// A device that disconnected, as far as it can still be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectedDevice {
    Known(Device),
    Unknown(DeviceId),
}

/// Builds classifications from the device snapshot and call state
#[derive(Clone)]
pub struct ConnectionClassifier {
    devices: DeviceSnapshotProvider,
    call_state: Option<Arc<dyn CallState>>,
}

impl ConnectionClassifier {
    pub fn new(devices: DeviceSnapshotProvider, call_state: Option<Arc<dyn CallState>>) -> Self {
        Self {
            devices,
            call_state,
        }
    }

    pub fn devices(&self) -> &DeviceSnapshotProvider {
        &self.devices
    }

    /// Filter a raw callback down to what arbitration cares about
    pub fn classify_event(&self, event: &ConnectionEvent) -> ConnectionKind {
        let device = self.devices.find_device(&event.device);

        match event.state {
            ConnectionState::Connected => {
                let Some(device) = device else {
                    return ConnectionKind::Ignored("device not cached");
                };
                if !device.connected {
                    return ConnectionKind::Ignored("device not connected");
                }
                let first_connection = self
                    .devices
                    .first_connected_profile_for(&device, event.profile);
                ConnectionKind::Connected {
                    device,
                    user_triggered: event.user_triggered,
                    first_connection,
                }
            }
            ConnectionState::Disconnected => match device {
                Some(device) if device.connected => {
                    ConnectionKind::Ignored("device still connected on another profile")
                }
                Some(device) => ConnectionKind::Disconnected(DisconnectedDevice::Known(device)),
                None => ConnectionKind::Disconnected(DisconnectedDevice::Unknown(
                    event.device.clone(),
                )),
            },
            ConnectionState::Connecting | ConnectionState::Disconnecting => {
                ConnectionKind::Ignored("transient state")
            }
        }
    }

    /// Classify a connected device against a snapshot
    pub fn classify(
        &self,
        device: &Device,
        user_triggered: bool,
        first_connection: bool,
        groups: &ConnectedGroups,
        session: &SharingSession,
    ) -> Classification {
        let capability = if device.is_sharing_capable() {
            DeviceCapability::LeAudio
        } else {
            DeviceCapability::Classic
        };
        let group_id = match capability {
            DeviceCapability::LeAudio => device.group_id,
            DeviceCapability::Classic => GroupId::INVALID,
        };

        let mut connected_group_count = groups.group_count();
        if group_id.is_valid() && !groups.contains(group_id) {
            connected_group_count += 1;
        }

        let other_sharing_groups = groups
            .sharing_items_excluding(group_id)
            .into_iter()
            .filter(|item| session.is_group_sharing(item.group_id))
            .collect();

        Classification {
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            group_id,
            capability,
            user_triggered,
            first_connection,
            snapshot_ready: self.devices.is_ready(),
            in_call: self.call_state.as_ref().is_some_and(|c| c.is_in_call()),
            connected_group_count,
            other_groups: groups.items_excluding(group_id),
            other_sharing_groups,
        }
    }
}

impl std::fmt::Debug for ConnectionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionClassifier")
            .field("devices", &self.devices)
            .field("call_state_bound", &self.call_state.is_some())
            .finish()
    }
}
