//! Model types for sharing-state

mod connection;
mod device;
mod id_types;
mod receive_state;

pub use connection::{ConnectionState, Profile, ProfileStatus};
pub use device::{Device, DeviceItem};
pub use id_types::{DeviceId, GroupId};
pub use receive_state::{BroadcastMetadata, ReceiveState, SourceId};
