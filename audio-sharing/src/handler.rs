//! The audio sharing handler
//!
//! Owns the dialog state of one host and runs the whole pipeline for a
//! connection: classify, arbitrate, then set the device active, add it to
//! the broadcast or show a dialog. Callback events from the profiles are
//! queued by [`sharing_events`] and handled here on the owning thread.

use std::sync::Arc;

use parking_lot::Mutex;
use sharing_events::{
    channel, AssistantEvent, BroadcastEvent, CallbackRegistration, CallbackSource,
    ConnectionEvent, EventQueue, EventSink, SharingEvent,
};
use sharing_state::{
    BroadcastAssistant, BroadcastProfile, CallState, ConnectedGroups, Device, DeviceId,
    DeviceRegistry, DeviceSnapshotProvider, GroupId, SharingSession, SharingSessionState,
    StateError,
};

use crate::arbiter::{arbitrate, Action, ArbiterPolicy};
use crate::classifier::{Classification, ConnectionClassifier, ConnectionKind, DisconnectedDevice};
use crate::config::SharingConfig;
use crate::dialog::{
    DialogHost, DialogManager, DialogRequest, DialogResponse, ResolveCallback, ShowOutcome,
};
use crate::error::Result;

/// The platform collaborators a handler works with
///
/// Profiles that are not bound yet are left as `None`.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn DeviceRegistry>,
    pub broadcast: Option<Arc<dyn BroadcastProfile>>,
    pub assistant: Option<Arc<dyn BroadcastAssistant>>,
    pub call_state: Option<Arc<dyn CallState>>,
    /// Sources registered on `start` and released on `stop`
    pub callback_sources: Vec<Arc<dyn CallbackSource>>,
}

impl Collaborators {
    pub fn new(registry: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            registry,
            broadcast: None,
            assistant: None,
            call_state: None,
            callback_sources: Vec::new(),
        }
    }

    pub fn with_broadcast(mut self, broadcast: Arc<dyn BroadcastProfile>) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub fn with_assistant(mut self, assistant: Arc<dyn BroadcastAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub fn with_call_state(mut self, call_state: Arc<dyn CallState>) -> Self {
        self.call_state = Some(call_state);
        self
    }

    pub fn with_callback_source(mut self, source: Arc<dyn CallbackSource>) -> Self {
        self.callback_sources.push(source);
        self
    }
}

/// Platform side effects run by actions and dialog callbacks
#[derive(Clone)]
struct SharingActions {
    registry: Arc<dyn DeviceRegistry>,
    sessions: SharingSessionState,
    assistant: Option<Arc<dyn BroadcastAssistant>>,
    target_sinks: Arc<Mutex<Vec<DeviceId>>>,
}

impl SharingActions {
    fn set_active(&self, device: &DeviceId) -> sharing_state::Result<()> {
        tracing::info!("Set {} active", device);
        self.registry.set_active(device)
    }

    fn stop_sharing(&self) -> sharing_state::Result<()> {
        let broadcast = self
            .sessions
            .broadcast()
            .ok_or(StateError::ProfileUnavailable("broadcast"))?;
        tracing::info!("Stop broadcast");
        broadcast.stop_latest_broadcast()
    }

    /// Remember `sinks` and start a private broadcast; the sinks get the
    /// source once playback starts
    fn start_sharing(&self, sinks: Vec<DeviceId>) -> sharing_state::Result<()> {
        let broadcast = self
            .sessions
            .broadcast()
            .ok_or(StateError::ProfileUnavailable("broadcast"))?;
        tracing::info!("Start broadcast with sinks: {}", sinks.len());
        *self.target_sinks.lock() = sinks;
        broadcast.start_private_broadcast()
    }

    /// Add the latest broadcast to every sink, continuing past failures
    fn add_source(&self, sinks: &[DeviceId]) -> sharing_state::Result<()> {
        let assistant = self
            .assistant
            .as_ref()
            .ok_or(StateError::ProfileUnavailable("broadcast assistant"))?;
        let metadata = self
            .sessions
            .latest_metadata()
            .ok_or_else(|| StateError::ActionFailed("no broadcast metadata".to_string()))?;

        let mut first_error = None;
        for sink in sinks {
            tracing::debug!("Add source {} to {}", metadata.broadcast_id, sink);
            if let Err(e) = assistant.add_source(sink, &metadata, false) {
                tracing::warn!("Failed to add source to {}: {}", sink, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Remove every known source from every sink, continuing past failures
    fn remove_sources(&self, sinks: &[DeviceId]) -> sharing_state::Result<()> {
        let assistant = self
            .assistant
            .as_ref()
            .ok_or(StateError::ProfileUnavailable("broadcast assistant"))?;

        let mut first_error = None;
        for sink in sinks {
            for source in assistant.all_sources(sink) {
                tracing::debug!("Remove source {} from {}", source.source_id, sink);
                if let Err(e) = assistant.remove_source(sink, source.source_id) {
                    tracing::warn!("Failed to remove source from {}: {}", sink, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn take_target_sinks(&self) -> Vec<DeviceId> {
        std::mem::take(&mut *self.target_sinks.lock())
    }
}

fn log_failure(what: &str, result: sharing_state::Result<()>) {
    if let Err(e) = result {
        tracing::warn!("Failed to {}: {}", what, e);
    }
}

/// Members of the connecting device's group, the device itself included
fn group_members(groups: &ConnectedGroups, c: &Classification) -> Vec<DeviceId> {
    let mut members: Vec<DeviceId> = groups
        .members(c.group_id)
        .iter()
        .map(|d| d.id.clone())
        .collect();
    if !members.contains(&c.device_id) {
        members.push(c.device_id.clone());
    }
    members
}

/// Every connected LE Audio device plus the connecting one
fn all_sinks(groups: &ConnectedGroups, c: &Classification) -> Vec<DeviceId> {
    let mut sinks: Vec<DeviceId> = groups.all_devices().map(|d| d.id.clone()).collect();
    if !sinks.contains(&c.device_id) {
        sinks.push(c.device_id.clone());
    }
    sinks
}

/// Connection arbitration for one dialog host
pub struct AudioSharingHandler {
    config: SharingConfig,
    policy: ArbiterPolicy,
    devices: DeviceSnapshotProvider,
    sessions: SharingSessionState,
    classifier: ConnectionClassifier,
    dialogs: DialogManager,
    callbacks: CallbackRegistration,
    sink: EventSink,
    queue: EventQueue,
    actions: SharingActions,
}

impl AudioSharingHandler {
    /// Create a handler; callbacks stay unregistered until `start`
    pub fn new(
        collaborators: Collaborators,
        host: Arc<dyn DialogHost>,
        config: SharingConfig,
    ) -> Result<Self> {
        config.validate()?;

        let Collaborators {
            registry,
            broadcast,
            assistant,
            call_state,
            callback_sources,
        } = collaborators;

        let devices = DeviceSnapshotProvider::new(Arc::clone(&registry), assistant.clone());
        let sessions = SharingSessionState::new(broadcast);
        let classifier = ConnectionClassifier::new(devices.clone(), call_state);
        let actions = SharingActions {
            registry,
            sessions: sessions.clone(),
            assistant,
            target_sinks: Arc::new(Mutex::new(Vec::new())),
        };

        let (sink, queue) = channel();
        let mut callbacks = CallbackRegistration::new(sink.clone());
        for source in callback_sources {
            callbacks.add_source(source);
        }

        Ok(Self {
            policy: ArbiterPolicy::from(&config),
            config,
            devices,
            sessions,
            classifier,
            dialogs: DialogManager::new(host),
            callbacks,
            sink,
            queue,
            actions,
        })
    }

    pub fn config(&self) -> &SharingConfig {
        &self.config
    }

    pub fn dialogs(&self) -> &DialogManager {
        &self.dialogs
    }

    pub fn devices(&self) -> &DeviceSnapshotProvider {
        &self.devices
    }

    /// Sink to hand to callback sources that are wired up by hand
    pub fn event_sink(&self) -> EventSink {
        self.sink.clone()
    }

    /// Sinks waiting for the broadcast to start playing
    pub fn target_sinks(&self) -> Vec<DeviceId> {
        self.actions.target_sinks.lock().clone()
    }

    pub fn is_started(&self) -> bool {
        self.callbacks.is_registered()
    }

    /// Register every callback source; a second call does nothing
    pub fn start(&mut self) -> Result<()> {
        self.callbacks.on_start()?;
        tracing::debug!("Audio sharing handler started");
        Ok(())
    }

    /// Unregister callbacks and tear down any open dialog
    ///
    /// Events still queued are discarded and their dialogs never shown.
    pub fn stop(&mut self) {
        self.callbacks.on_stop();
        self.dialogs.dismiss_all();
        let discarded = self.queue.drain().len();
        if discarded > 0 {
            tracing::debug!("Discarded {} queued events on stop", discarded);
        }
        self.actions.take_target_sinks();
    }

    /// Handle every queued callback event; returns how many were handled
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.try_recv() {
            if let Err(e) = self.handle_event(event) {
                tracing::warn!("Failed to handle sharing event: {}", e);
            }
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: SharingEvent) -> Result<()> {
        match event {
            SharingEvent::Connection(event) => self.handle_connection_event(&event).map(|_| ()),
            SharingEvent::Broadcast(event) => {
                self.handle_broadcast_event(&event);
                Ok(())
            }
            SharingEvent::Assistant(event) => {
                handle_assistant_event(&event);
                Ok(())
            }
        }
    }

    /// Classify a profile connection transition and act on it
    pub fn handle_connection_event(&mut self, event: &ConnectionEvent) -> Result<Action> {
        match self.classifier.classify_event(event) {
            ConnectionKind::Connected {
                device,
                user_triggered,
                first_connection,
            } => self.handle_connection(&device, user_triggered, first_connection),
            ConnectionKind::Disconnected(DisconnectedDevice::Known(device)) => {
                if device.is_sharing_capable() {
                    self.close_opening_dialogs_for_lea_device(&device);
                } else {
                    self.close_opening_dialogs_for_non_lea_device(&device);
                }
                Ok(Action::NoOp)
            }
            ConnectionKind::Disconnected(DisconnectedDevice::Unknown(id)) => {
                self.dialogs.close_for_device(&id);
                Ok(Action::NoOp)
            }
            ConnectionKind::Ignored(reason) => {
                tracing::debug!(
                    "Ignore {:?} {:?} for {}: {}",
                    event.profile,
                    event.state,
                    event.device,
                    reason
                );
                Ok(Action::NoOp)
            }
        }
    }

    /// Decide and act for a device whose first profile just connected
    ///
    /// Returns the action taken. A dialog action is returned even when the
    /// dialog was dropped because another one is open.
    pub fn handle_device_connected(
        &mut self,
        device: &Device,
        user_triggered: bool,
    ) -> Result<Action> {
        self.handle_connection(device, user_triggered, true)
    }

    /// Retract a dialog concerning the group of an LE Audio device
    pub fn close_opening_dialogs_for_lea_device(&mut self, device: &Device) -> bool {
        self.dialogs.close_for_group(device.group_id)
    }

    /// Retract a dialog concerning a classic device
    pub fn close_opening_dialogs_for_non_lea_device(&mut self, device: &Device) -> bool {
        self.dialogs.close_for_device(&device.id)
    }

    /// Deliver the user's answer to the open dialog
    pub fn resolve_dialog(&mut self, response: DialogResponse) -> bool {
        self.dialogs.resolve(response)
    }

    fn handle_connection(
        &mut self,
        device: &Device,
        user_triggered: bool,
        first_connection: bool,
    ) -> Result<Action> {
        let groups = self.devices.connected_groups();
        let session = self.sessions.session(&groups);
        let classification =
            self.classifier
                .classify(device, user_triggered, first_connection, &groups, &session);
        let action = arbitrate(&classification, &session, &self.policy);

        tracing::debug!(
            "{} ({:?}, group {}, sharing {}) -> {:?}",
            device.id,
            classification.capability,
            classification.group_id,
            session.is_enabled(),
            action
        );
        self.execute(&action, &classification, &groups, &session)?;
        Ok(action)
    }

    fn execute(
        &mut self,
        action: &Action,
        classification: &Classification,
        groups: &ConnectedGroups,
        session: &SharingSession,
    ) -> Result<()> {
        let on_resolve: ResolveCallback = match action {
            Action::NoOp => return Ok(()),
            Action::SetActive(device) => {
                self.actions.set_active(device)?;
                return Ok(());
            }
            Action::AutoJoin { device, group_id } => {
                tracing::info!(
                    "Automatically add {} to the sharing, group {} already joined",
                    device,
                    group_id
                );
                self.actions.add_source(std::slice::from_ref(device))?;
                return Ok(());
            }
            Action::ShowStopDialog { .. } => {
                let actions = self.actions.clone();
                let device = classification.device_id.clone();
                Box::new(move |response: DialogResponse| {
                    if response == DialogResponse::Confirm {
                        log_failure("set active", actions.set_active(&device));
                        log_failure("stop broadcast", actions.stop_sharing());
                    }
                })
            }
            Action::ShowJoinDialog { .. } if session.is_enabled() => {
                let actions = self.actions.clone();
                let members = group_members(groups, classification);
                Box::new(move |response: DialogResponse| {
                    if response == DialogResponse::Confirm {
                        log_failure("add source", actions.add_source(&members));
                    }
                })
            }
            Action::ShowJoinDialog { .. } => {
                let actions = self.actions.clone();
                let device = classification.device_id.clone();
                let sinks = all_sinks(groups, classification);
                Box::new(move |response: DialogResponse| match response {
                    DialogResponse::Confirm => {
                        log_failure("start broadcast", actions.start_sharing(sinks));
                    }
                    DialogResponse::Cancel => {
                        log_failure("set active", actions.set_active(&device));
                    }
                    DialogResponse::Disconnect(_) => {}
                })
            }
            Action::ShowDisconnectDialog { .. } => {
                let actions = self.actions.clone();
                let members = group_members(groups, classification);
                let grouped: Vec<(GroupId, Vec<DeviceId>)> = groups
                    .groups()
                    .map(|g| (g.group_id, g.members.iter().map(|d| d.id.clone()).collect()))
                    .collect();
                Box::new(move |response: DialogResponse| {
                    let DialogResponse::Disconnect(chosen) = response else {
                        return;
                    };
                    let Some((_, dropped)) = grouped.iter().find(|(g, _)| *g == chosen) else {
                        tracing::warn!("Fail to remove source for group {}", chosen);
                        return;
                    };
                    log_failure("remove source", actions.remove_sources(dropped));
                    log_failure("add source", actions.add_source(&members));
                })
            }
        };

        let Some(tag) = action.dialog_tag() else {
            return Ok(());
        };
        let request = DialogRequest {
            tag,
            device: classification.device_id.clone(),
            device_name: classification.device_name.clone(),
            group_id: classification.group_id,
            items: action.dialog_items().to_vec(),
            user_triggered: classification.user_triggered,
        };
        if let ShowOutcome::Dropped(open) = self.dialogs.show(request, on_resolve) {
            tracing::debug!("{} not shown, {} still waiting for the user", tag, open);
        }
        Ok(())
    }

    fn handle_broadcast_event(&mut self, event: &BroadcastEvent) {
        match event {
            BroadcastEvent::PlaybackStarted {
                reason,
                broadcast_id,
            } => {
                tracing::debug!(
                    "onPlaybackStarted(), reason = {}, broadcastId = {}",
                    reason,
                    broadcast_id
                );
                let sinks = self.actions.take_target_sinks();
                if !sinks.is_empty() {
                    log_failure("add source to target sinks", self.actions.add_source(&sinks));
                }
            }
            BroadcastEvent::StartFailed { reason } => {
                tracing::warn!("Fail to start broadcast, reason {}", reason);
                self.actions.take_target_sinks();
            }
            BroadcastEvent::StopFailed { reason } => {
                tracing::warn!("Fail to stop broadcast, reason {}", reason);
            }
            other => tracing::debug!("Broadcast event {:?}", other),
        }
    }
}

fn handle_assistant_event(event: &AssistantEvent) {
    match event {
        AssistantEvent::SourceAddFailed { sink, reason } => {
            tracing::warn!("Fail to add source to {}, reason {}", sink, reason);
        }
        other => tracing::debug!("Assistant event {:?}", other),
    }
}

impl std::fmt::Debug for AudioSharingHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSharingHandler")
            .field("config", &self.config)
            .field("devices", &self.devices)
            .field("sessions", &self.sessions)
            .field("dialogs", &self.dialogs)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
