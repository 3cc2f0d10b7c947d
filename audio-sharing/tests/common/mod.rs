//! Recording mock collaborators for handler integration tests.
//!
//! `MockPlatform` plays every Bluetooth collaborator at once (device registry,
//! broadcast, broadcast assistant, call state) and records each action it is
//! asked to perform. `MockHost` records dialogs and `MockSource` holds the
//! sinks handed to it so tests can fire callbacks.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use audio_sharing::sharing_events::{
    CallbackSource, EventSink, RegistrationId, Result as EventResult, SharingEvent,
};
use audio_sharing::sharing_state::{
    BroadcastAssistant, BroadcastMetadata, BroadcastProfile, CallState, ConnectionState, Device,
    DeviceId, DeviceRegistry, GroupId, Profile, ProfileStatus, ReceiveState, Result, SourceId,
    StateError,
};
use audio_sharing::{
    AudioSharingHandler, Collaborators, DialogHost, DialogRequest, DialogTag, SharingConfig,
};
use parking_lot::Mutex;

/// A platform action observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetActive(DeviceId),
    StartBroadcast,
    StopBroadcast,
    AddSource(DeviceId),
    RemoveSource(DeviceId, SourceId),
}

/// Every Bluetooth collaborator in one recording mock
#[derive(Default)]
pub struct MockPlatform {
    devices: Mutex<Vec<Device>>,
    sources: Mutex<HashMap<DeviceId, Vec<ReceiveState>>>,
    broadcasting: AtomicBool,
    in_call: AtomicBool,
    fail_set_active: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add or replace a device in the registry
    pub fn connect(&self, device: Device) {
        let mut devices = self.devices.lock();
        devices.retain(|d| d.id != device.id);
        devices.push(device);
    }

    /// Mark a device and all of its profiles disconnected
    pub fn disconnect(&self, id: &str) {
        let id = DeviceId::new(id);
        for device in self.devices.lock().iter_mut().filter(|d| d.id == id) {
            device.connected = false;
            for profile in device.profiles.iter_mut() {
                profile.state = ConnectionState::Disconnected;
            }
        }
        self.sources.lock().remove(&id);
    }

    /// Give a device a synced broadcast source
    pub fn set_sharing(&self, id: &str) {
        self.sources
            .lock()
            .insert(DeviceId::new(id), vec![ReceiveState::synced(1)]);
    }

    pub fn set_broadcasting(&self, enabled: bool) {
        self.broadcasting.store(enabled, Ordering::SeqCst);
    }

    pub fn set_in_call(&self, in_call: bool) {
        self.in_call.store(in_call, Ordering::SeqCst);
    }

    pub fn fail_set_active(&self) {
        self.fail_set_active.store(true, Ordering::SeqCst);
    }

    pub fn device(&self, id: &str) -> Device {
        let id = DeviceId::new(id);
        self.devices
            .lock()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("device {} not registered", id))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl DeviceRegistry for MockPlatform {
    fn find_device(&self, id: &DeviceId) -> Option<Device> {
        self.devices.lock().iter().find(|d| &d.id == id).cloned()
    }

    fn set_active(&self, id: &DeviceId) -> Result<()> {
        self.calls.lock().push(Call::SetActive(id.clone()));
        if self.fail_set_active.load(Ordering::SeqCst) {
            return Err(StateError::ActionFailed("set active rejected".to_string()));
        }
        Ok(())
    }
}

impl BroadcastProfile for MockPlatform {
    fn is_enabled(&self) -> bool {
        self.broadcasting.load(Ordering::SeqCst)
    }

    fn start_private_broadcast(&self) -> Result<()> {
        self.calls.lock().push(Call::StartBroadcast);
        self.broadcasting.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_latest_broadcast(&self) -> Result<()> {
        self.calls.lock().push(Call::StopBroadcast);
        self.broadcasting.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn latest_metadata(&self) -> Option<BroadcastMetadata> {
        self.is_enabled().then(|| BroadcastMetadata {
            broadcast_id: 1,
            name: "Test broadcast".to_string(),
        })
    }
}

impl BroadcastAssistant for MockPlatform {
    fn all_connected_devices(&self) -> Vec<DeviceId> {
        self.devices
            .lock()
            .iter()
            .filter(|d| d.connected && d.profile_state(Profile::LeAudio).is_connected())
            .map(|d| d.id.clone())
            .collect()
    }

    fn all_sources(&self, sink: &DeviceId) -> Vec<ReceiveState> {
        self.sources.lock().get(sink).cloned().unwrap_or_default()
    }

    fn add_source(
        &self,
        sink: &DeviceId,
        metadata: &BroadcastMetadata,
        _group_op: bool,
    ) -> Result<()> {
        self.calls.lock().push(Call::AddSource(sink.clone()));
        self.sources
            .lock()
            .insert(sink.clone(), vec![ReceiveState::synced(metadata.broadcast_id)]);
        Ok(())
    }

    fn remove_source(&self, sink: &DeviceId, source_id: SourceId) -> Result<()> {
        self.calls.lock().push(Call::RemoveSource(sink.clone(), source_id));
        if let Some(sources) = self.sources.lock().get_mut(sink) {
            sources.retain(|s| s.source_id != source_id);
        }
        Ok(())
    }
}

impl CallState for MockPlatform {
    fn is_in_call(&self) -> bool {
        self.in_call.load(Ordering::SeqCst)
    }
}

/// Dialog host that records what it was asked to show and dismiss
pub struct MockHost {
    attached: AtomicBool,
    shown: Mutex<Vec<DialogRequest>>,
    dismissed: Mutex<Vec<DialogTag>>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attached: AtomicBool::new(true),
            shown: Mutex::new(Vec::new()),
            dismissed: Mutex::new(Vec::new()),
        })
    }

    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn shown(&self) -> Vec<DialogRequest> {
        self.shown.lock().clone()
    }

    pub fn dismissed(&self) -> Vec<DialogTag> {
        self.dismissed.lock().clone()
    }
}

impl DialogHost for MockHost {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn show(&self, request: &DialogRequest) {
        self.shown.lock().push(request.clone());
    }

    fn dismiss(&self, tag: DialogTag) {
        self.dismissed.lock().push(tag);
    }
}

/// Callback source that keeps registered sinks so tests can fire events
#[derive(Default)]
pub struct MockSource {
    next_id: AtomicU64,
    sinks: Mutex<HashMap<RegistrationId, EventSink>>,
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn registrations(&self) -> usize {
        self.sinks.lock().len()
    }

    /// Post an event to every registered sink, as a profile callback would
    pub fn emit(&self, event: impl Into<SharingEvent>) {
        let event = event.into();
        for sink in self.sinks.lock().values() {
            sink.post(event.clone()).unwrap();
        }
    }
}

impl CallbackSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn register_callback(&self, sink: EventSink) -> EventResult<RegistrationId> {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sinks.lock().insert(id, sink);
        Ok(id)
    }

    fn unregister_callback(&self, id: RegistrationId) -> EventResult<()> {
        self.sinks.lock().remove(&id);
        Ok(())
    }
}

/// Connected LE Audio device
pub fn le_device(id: &str, name: &str, group: i32) -> Device {
    Device::new(id, name, GroupId::new(group))
        .with_profile(ProfileStatus::connected(Profile::LeAudio))
}

/// Connected classic (A2DP only) device
pub fn classic_device(id: &str, name: &str) -> Device {
    Device::new(id, name, GroupId::INVALID).with_profile(ProfileStatus::connected(Profile::A2dp))
}

/// Collaborators with every profile bound to `platform`
pub fn collaborators(platform: &Arc<MockPlatform>) -> Collaborators {
    Collaborators::new(platform.clone())
        .with_broadcast(platform.clone())
        .with_assistant(platform.clone())
        .with_call_state(platform.clone())
}

/// Route handler logs to the test writer; set RUST_LOG to see them
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Handler with default config and every profile bound
pub fn create_handler(platform: &Arc<MockPlatform>, host: &Arc<MockHost>) -> AudioSharingHandler {
    init_test_logging();
    AudioSharingHandler::new(collaborators(platform), host.clone(), SharingConfig::default())
        .unwrap()
}
