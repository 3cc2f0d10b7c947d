//! Platform collaborators consumed by the sharing subsystem
//!
//! These traits abstract the Bluetooth profile proxies. Implementations
//! must answer reads synchronously from whatever the platform currently
//! reports; none of the calls may block waiting for a proxy to bind.

use crate::error::Result;
use crate::model::{BroadcastMetadata, Device, DeviceId, ReceiveState, SourceId};

/// The local LE Audio broadcast source
pub trait BroadcastProfile: Send + Sync {
    /// Check if a broadcast is currently running
    fn is_enabled(&self) -> bool;

    /// Start a broadcast whose sinks are chosen by this device
    fn start_private_broadcast(&self) -> Result<()>;

    /// Stop the most recently started broadcast
    fn stop_latest_broadcast(&self) -> Result<()>;

    /// Metadata of the most recent broadcast, if any
    fn latest_metadata(&self) -> Option<BroadcastMetadata>;
}

/// The broadcast assistant, which manages sources on remote sinks
pub trait BroadcastAssistant: Send + Sync {
    /// All devices with a connected assistant profile
    fn all_connected_devices(&self) -> Vec<DeviceId>;

    /// Broadcast sources currently known to `sink`
    fn all_sources(&self, sink: &DeviceId) -> Vec<ReceiveState>;

    fn add_source(&self, sink: &DeviceId, metadata: &BroadcastMetadata, group_op: bool)
        -> Result<()>;

    fn remove_source(&self, sink: &DeviceId, source_id: SourceId) -> Result<()>;
}

/// Lookup and control of cached remote devices
pub trait DeviceRegistry: Send + Sync {
    fn find_device(&self, id: &DeviceId) -> Option<Device>;

    /// Make the device the active audio output
    fn set_active(&self, id: &DeviceId) -> Result<()>;
}

/// Telephony state
pub trait CallState: Send + Sync {
    fn is_in_call(&self) -> bool;
}
