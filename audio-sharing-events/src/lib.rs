//! # Audio Sharing Events
//!
//! Callback plumbing for the audio sharing subsystem.
//!
//! ## Overview
//!
//! Profile callbacks (broadcast, broadcast assistant, device connection
//! state) arrive on a callback thread. They are converted into
//! [`SharingEvent`]s and posted through an [`EventSink`]; the thread that
//! owns the dialog state drains the matching [`EventQueue`]. This is the
//! only thread crossing in the subsystem and it only goes one way.
//!
//! [`CallbackRegistration`] ties the registrations to an explicit
//! `on_start` / `on_stop` pair.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sharing_events::{channel, CallbackRegistration};
//!
//! let (sink, queue) = sharing_events::channel();
//! let mut callbacks = CallbackRegistration::new(sink)
//!     .with_source(broadcast_source)
//!     .with_source(assistant_source);
//!
//! callbacks.on_start()?;
//! for event in queue.try_iter() {
//!     handle(event);
//! }
//! callbacks.on_stop();
//! ```

pub mod error;
pub mod event;
pub mod lifecycle;
pub mod queue;

pub use error::{EventError, Result};
pub use event::{AssistantEvent, BroadcastEvent, ConnectionEvent, SharingEvent};
pub use lifecycle::{CallbackRegistration, CallbackSource, RegistrationId};
pub use queue::{channel, EventQueue, EventSink, TryIterator};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        channel, AssistantEvent, BroadcastEvent, CallbackRegistration, CallbackSource,
        ConnectionEvent, EventError, EventQueue, EventSink, RegistrationId, SharingEvent,
    };
}
