//! Audio Sharing State
//!
//! Synchronous snapshots of the Bluetooth state that LE Audio sharing
//! decisions depend on.
//!
//! # Architecture
//!
//! ```text
//! BroadcastAssistant ─┐
//! DeviceRegistry ─────┼→ DeviceSnapshotProvider → ConnectedGroups ─┐
//!                     │                                           ├→ SharingSession
//! BroadcastProfile ───┴→ SharingSessionState ─────────────────────┘
//! ```
//!
//! Every read goes to the collaborators at call time. A collaborator that
//! is not bound yet answers "nothing known" (empty lists, `false`), never
//! an error.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sharing_state::{DeviceSnapshotProvider, SharingSessionState};
//!
//! let devices = DeviceSnapshotProvider::new(registry, Some(assistant));
//! let sessions = SharingSessionState::new(Some(broadcast));
//!
//! let groups = devices.connected_groups();
//! let session = sessions.session(&groups);
//! if session.is_enabled() {
//!     println!("{} groups sharing", session.sharing_group_ids().len());
//! }
//! ```

pub mod error;
pub mod logging;
pub mod model;
pub mod profile;
pub mod session;
pub mod snapshot;

pub use error::{Result, StateError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use model::{
    BroadcastMetadata, ConnectionState, Device, DeviceId, DeviceItem, GroupId, Profile,
    ProfileStatus, ReceiveState, SourceId,
};
pub use profile::{BroadcastAssistant, BroadcastProfile, CallState, DeviceRegistry};
pub use session::{SharingSession, SharingSessionState};
pub use snapshot::{ConnectedGroups, DeviceSnapshotProvider, GroupSnapshot};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::model::{Device, DeviceId, DeviceItem, GroupId, Profile, ProfileStatus};
    pub use crate::profile::{BroadcastAssistant, BroadcastProfile, CallState, DeviceRegistry};
    pub use crate::session::{SharingSession, SharingSessionState};
    pub use crate::snapshot::{ConnectedGroups, DeviceSnapshotProvider};
}
