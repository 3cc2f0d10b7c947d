//! Dialog lifecycle
//!
//! At most one sharing dialog is open per host. The open dialog is kept as
//! a single `Option<DialogSession>` with explicit show, resolve and retract
//! operations; the host only renders what it is told to.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use sharing_state::{DeviceId, DeviceItem, GroupId};

/// The three sharing dialogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogTag {
    /// Offer to share audio with a newly connected LE Audio device
    Join,
    /// Offer to stop sharing for a device that cannot join
    Stop,
    /// Ask which sharing group to drop when the group cap is reached
    Disconnect,
}

impl DialogTag {
    /// Stable tag the host can key its window/fragment on
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogTag::Join => "AudioSharingJoinDialog",
            DialogTag::Stop => "AudioSharingStopDialog",
            DialogTag::Disconnect => "AudioSharingDisconnectDialog",
        }
    }
}

impl fmt::Display for DialogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the host needs to render one dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    pub tag: DialogTag,
    /// The device whose connection raised the dialog
    pub device: DeviceId,
    pub device_name: String,
    /// `GroupId::INVALID` for classic devices
    pub group_id: GroupId,
    /// Sharing or candidate groups listed in the dialog
    pub items: Vec<DeviceItem>,
    pub user_triggered: bool,
}

/// The user's answer to a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResponse {
    /// "Share" on the join dialog, "Stop sharing" on the stop dialog
    Confirm,
    /// A group picked on the disconnect dialog
    Disconnect(GroupId),
    Cancel,
}

/// Callback run once with the user's answer
pub type ResolveCallback = Box<dyn FnOnce(DialogResponse) + Send>;

/// Renders modal dialogs on behalf of the manager
pub trait DialogHost: Send + Sync {
    /// Whether the host UI is attached and can show dialogs
    fn is_attached(&self) -> bool;

    fn show(&self, request: &DialogRequest);

    fn dismiss(&self, tag: DialogTag);
}

/// The dialog currently open
pub struct DialogSession {
    request: DialogRequest,
    shown_at: Instant,
    on_resolve: ResolveCallback,
}

impl DialogSession {
    pub fn tag(&self) -> DialogTag {
        self.request.tag
    }

    pub fn request(&self) -> &DialogRequest {
        &self.request
    }

    pub fn device(&self) -> &DeviceId {
        &self.request.device
    }

    pub fn group_id(&self) -> GroupId {
        self.request.group_id
    }

    pub fn shown_at(&self) -> Instant {
        self.shown_at
    }

    /// Whether this session concerns the same device or group as `request`
    fn concerns_same_target(&self, request: &DialogRequest) -> bool {
        self.request.device == request.device
            || (self.group_id().is_valid() && self.group_id() == request.group_id)
    }
}

impl fmt::Debug for DialogSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogSession")
            .field("request", &self.request)
            .field("shown_at", &self.shown_at)
            .finish_non_exhaustive()
    }
}

/// Result of asking the manager to show a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    Shown,
    /// An open dialog for the same device or group was replaced
    Replaced(DialogTag),
    /// A dialog for another device is open; the request was discarded
    Dropped(DialogTag),
    /// The host is not attached
    HostDetached,
}

/// Owns the single open dialog of one host
pub struct DialogManager {
    host: Arc<dyn DialogHost>,
    current: Option<DialogSession>,
}

impl DialogManager {
    pub fn new(host: Arc<dyn DialogHost>) -> Self {
        Self {
            host,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&DialogSession> {
        self.current.as_ref()
    }

    pub fn is_showing(&self) -> bool {
        self.current.is_some()
    }

    /// Show a dialog unless one for a different device or group is open
    ///
    /// A pending decision for another device is never overwritten; the new
    /// request is dropped and logged. A dialog for the same device or group
    /// is replaced so it reflects the latest snapshot.
    pub fn show(&mut self, request: DialogRequest, on_resolve: ResolveCallback) -> ShowOutcome {
        if !self.host.is_attached() {
            tracing::debug!("Skip {} for {}, host not attached", request.tag, request.device);
            return ShowOutcome::HostDetached;
        }

        let mut outcome = ShowOutcome::Shown;
        if let Some(open) = &self.current {
            if !open.concerns_same_target(&request) {
                tracing::warn!(
                    "Drop {} for {}: {} for {} is still open",
                    request.tag,
                    request.device,
                    open.tag(),
                    open.device()
                );
                return ShowOutcome::Dropped(open.tag());
            }
            let replaced = open.tag();
            tracing::info!("Replace {} with {} for {}", replaced, request.tag, request.device);
            self.host.dismiss(replaced);
            outcome = ShowOutcome::Replaced(replaced);
        }

        tracing::info!(
            "Show {} for {} (group {}, {} items)",
            request.tag,
            request.device,
            request.group_id,
            request.items.len()
        );
        self.host.show(&request);
        self.current = Some(DialogSession {
            request,
            shown_at: Instant::now(),
            on_resolve,
        });
        outcome
    }

    /// Deliver the user's answer to the open dialog
    ///
    /// The session is removed before its callback runs. Returns false when no
    /// dialog is open.
    pub fn resolve(&mut self, response: DialogResponse) -> bool {
        let Some(session) = self.current.take() else {
            tracing::debug!("Ignore dialog response {:?}, no dialog open", response);
            return false;
        };
        tracing::info!(
            "{} for {} resolved with {:?} after {:?}",
            session.tag(),
            session.device(),
            response,
            session.shown_at.elapsed()
        );
        (session.on_resolve)(response);
        true
    }

    /// Retract the open dialog if it concerns `group_id`
    pub fn close_for_group(&mut self, group_id: GroupId) -> bool {
        if !group_id.is_valid() {
            return false;
        }
        let matches = self
            .current
            .as_ref()
            .is_some_and(|s| s.group_id() == group_id);
        if matches {
            tracing::info!("Remove staled opening dialog for group {}", group_id);
            self.retract();
        }
        matches
    }

    /// Retract the open dialog if it concerns `device`
    pub fn close_for_device(&mut self, device: &DeviceId) -> bool {
        let matches = self
            .current
            .as_ref()
            .is_some_and(|s| s.device() == device);
        if matches {
            tracing::info!("Remove staled opening dialog for device {}", device);
            self.retract();
        }
        matches
    }

    /// Dismiss whatever is open without running its callback
    pub fn dismiss_all(&mut self) {
        if self.current.is_some() {
            self.retract();
        }
    }

    fn retract(&mut self) {
        if let Some(session) = self.current.take() {
            if self.host.is_attached() {
                self.host.dismiss(session.tag());
            }
        }
    }
}

impl fmt::Debug for DialogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogManager")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
