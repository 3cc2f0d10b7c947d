//! # Audio Sharing
//!
//! Decides, whenever a Bluetooth audio device connects, whether to make it
//! the active output, add it to a running LE Audio broadcast, or ask the
//! user through one of three dialogs (join, stop, disconnect), and retracts
//! those dialogs when the device they concern goes away.
//!
//! ## Pipeline
//!
//! ```text
//! profile callbacks ─→ EventSink ─→ EventQueue ─┐
//!                                               ▼
//! ConnectionEvent ─→ ConnectionClassifier ─→ arbitrate() ─→ Action
//!                      (DeviceSnapshotProvider,               │
//!                       SharingSessionState)                  ▼
//!                                     set_active / add_source / DialogManager
//! ```
//!
//! [`arbitrate`] is a pure function of a [`Classification`] and a
//! [`SharingSession`](sharing_state::SharingSession). The only mutable
//! state is the single open dialog held by [`DialogManager`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use audio_sharing::{AudioSharingHandler, Collaborators, SharingConfig};
//!
//! let collaborators = Collaborators::new(registry)
//!     .with_broadcast(broadcast)
//!     .with_assistant(assistant)
//!     .with_callback_source(connection_events);
//! let mut handler = AudioSharingHandler::new(collaborators, host, SharingConfig::default())?;
//!
//! handler.start()?;
//! // on the owning thread, whenever woken up:
//! handler.process_pending();
//! // user answered the dialog:
//! handler.resolve_dialog(DialogResponse::Confirm);
//! handler.stop();
//! ```

pub mod arbiter;
pub mod classifier;
pub mod config;
pub mod dialog;
pub mod error;
pub mod handler;

pub use arbiter::{arbitrate, Action, ArbiterPolicy};
pub use classifier::{
    Classification, ConnectionClassifier, ConnectionKind, DeviceCapability, DisconnectedDevice,
};
pub use config::SharingConfig;
pub use dialog::{
    DialogHost, DialogManager, DialogRequest, DialogResponse, DialogSession, DialogTag,
    ResolveCallback, ShowOutcome,
};
pub use error::{Result, SharingError};
pub use handler::{AudioSharingHandler, Collaborators};

// Re-export the lower layers so hosts need a single dependency
pub use sharing_events;
pub use sharing_state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, AudioSharingHandler, Collaborators, DialogHost, DialogRequest, DialogResponse,
        DialogTag, SharingConfig, SharingError,
    };
    pub use sharing_events::prelude::*;
    pub use sharing_state::prelude::*;
}
