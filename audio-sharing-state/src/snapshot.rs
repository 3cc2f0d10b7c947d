//! Device snapshots for connection arbitration
//!
//! `DeviceSnapshotProvider` wraps the broadcast assistant and the device
//! registry and answers, at the moment it is asked, which devices are
//! connected, how they group, and which groups already receive the
//! broadcast. Nothing here is cached between calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{Device, DeviceId, DeviceItem, GroupId, Profile, ReceiveState};
use crate::profile::{BroadcastAssistant, DeviceRegistry};

/// Connected members of one coordinated set
#[derive(Debug, Clone)]
pub struct GroupSnapshot {
    pub group_id: GroupId,
    pub members: Vec<Device>,
    /// Whether any member has a synced broadcast source
    pub sharing: bool,
}

impl GroupSnapshot {
    /// The member used to represent the group in dialogs
    pub fn lead(&self) -> Option<&Device> {
        self.members.first()
    }

    pub fn item(&self) -> Option<DeviceItem> {
        self.lead().map(DeviceItem::from)
    }
}

/// Connected LE Audio devices keyed by group id
///
/// Ordered by group id so that dialog lists are deterministic.
#[derive(Debug, Clone, Default)]
pub struct ConnectedGroups {
    groups: BTreeMap<GroupId, GroupSnapshot>,
}

impl ConnectedGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, group_id: GroupId) -> bool {
        self.groups.contains_key(&group_id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupSnapshot> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Members of `group_id`, empty if the group is not connected
    pub fn members(&self, group_id: GroupId) -> &[Device] {
        self.groups
            .get(&group_id)
            .map(|g| g.members.as_slice())
            .unwrap_or(&[])
    }

    /// Every connected device across all groups
    pub fn all_devices(&self) -> impl Iterator<Item = &Device> {
        self.groups.values().flat_map(|g| g.members.iter())
    }

    /// Groups that currently receive the broadcast
    pub fn sharing_groups(&self) -> impl Iterator<Item = &GroupSnapshot> {
        self.groups.values().filter(|g| g.sharing)
    }

    /// Dialog items for every group other than `excluded`
    pub fn items_excluding(&self, excluded: GroupId) -> Vec<DeviceItem> {
        self.groups
            .values()
            .filter(|g| g.group_id != excluded)
            .filter_map(GroupSnapshot::item)
            .collect()
    }

    /// Dialog items for sharing groups other than `excluded`
    pub fn sharing_items_excluding(&self, excluded: GroupId) -> Vec<DeviceItem> {
        self.sharing_groups()
            .filter(|g| g.group_id != excluded)
            .filter_map(GroupSnapshot::item)
            .collect()
    }

    fn insert(&mut self, device: Device, sharing: bool) {
        let group_id = device.group_id;
        let entry = self.groups.entry(group_id).or_insert_with(|| GroupSnapshot {
            group_id,
            members: Vec::new(),
            sharing: false,
        });
        entry.sharing |= sharing;
        entry.members.push(device);
    }
}

/// Synchronous view over the connected-device state of the platform
#[derive(Clone)]
pub struct DeviceSnapshotProvider {
    registry: Arc<dyn DeviceRegistry>,
    assistant: Option<Arc<dyn BroadcastAssistant>>,
}

impl DeviceSnapshotProvider {
    /// Create a provider; `assistant` is `None` until the proxy is bound
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        assistant: Option<Arc<dyn BroadcastAssistant>>,
    ) -> Self {
        Self {
            registry,
            assistant,
        }
    }

    /// Check if the assistant proxy is bound
    ///
    /// Without it no group or source information exists at all.
    pub fn is_ready(&self) -> bool {
        self.assistant.is_some()
    }

    pub fn assistant(&self) -> Option<&Arc<dyn BroadcastAssistant>> {
        self.assistant.as_ref()
    }

    pub fn registry(&self) -> &Arc<dyn DeviceRegistry> {
        &self.registry
    }

    pub fn find_device(&self, id: &DeviceId) -> Option<Device> {
        self.registry.find_device(id)
    }

    /// All devices with a connected assistant profile that the registry knows
    pub fn connected_devices(&self) -> Vec<Device> {
        let Some(assistant) = &self.assistant else {
            return Vec::new();
        };

        assistant
            .all_connected_devices()
            .iter()
            .filter_map(|id| {
                let device = self.registry.find_device(id);
                if device.is_none() {
                    tracing::debug!("Skip device due to not being cached: {}", id);
                }
                device
            })
            .collect()
    }

    /// Connected devices grouped by their coordinated-set id
    ///
    /// Devices without a valid group id are skipped.
    pub fn connected_groups(&self) -> ConnectedGroups {
        let mut groups = ConnectedGroups::new();
        for device in self.connected_devices() {
            if !device.group_id.is_valid() {
                tracing::debug!("Skip device due to no valid group id: {}", device.id);
                continue;
            }
            let sharing = self.has_active_source(&device.id);
            groups.insert(device, sharing);
        }
        groups
    }

    /// Broadcast sources currently known to `id`
    pub fn sources(&self, id: &DeviceId) -> Vec<ReceiveState> {
        self.assistant
            .as_ref()
            .map(|a| a.all_sources(id))
            .unwrap_or_default()
    }

    /// Check if the device is synced to at least one broadcast
    pub fn has_active_source(&self, id: &DeviceId) -> bool {
        self.sources(id).iter().any(ReceiveState::is_synced)
    }

    /// Check if any connected member of `group_id` receives the broadcast
    pub fn is_sharing_group(&self, group_id: GroupId) -> bool {
        if !group_id.is_valid() {
            return false;
        }
        self.connected_devices()
            .iter()
            .filter(|d| d.group_id == group_id)
            .any(|d| self.has_active_source(&d.id))
    }

    /// Check if `profile` is the profile that brought this device up
    ///
    /// For LE Audio devices only the LE Audio profile transition counts;
    /// for every other device only the first profile to connect counts.
    pub fn first_connected_profile_for(&self, device: &Device, profile: Profile) -> bool {
        if device.supports_le_audio() {
            profile == Profile::LeAudio
        } else {
            device.is_first_connected_profile(profile)
        }
    }
}

impl std::fmt::Debug for DeviceSnapshotProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSnapshotProvider")
            .field("assistant_bound", &self.assistant.is_some())
            .finish()
    }
}
