//! Device and DeviceItem types

use super::{ConnectionState, DeviceId, GroupId, Profile, ProfileStatus};
use serde::{Deserialize, Serialize};

/// A remote Bluetooth device as reported by the device registry
///
/// Devices are owned by the platform. The arbitration code only holds
/// clones of them while handling a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub group_id: GroupId,
    /// Whether the ACL link is up
    pub connected: bool,
    pub profiles: Vec<ProfileStatus>,
}

impl Device {
    /// Create a connected device with no profiles
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, group_id: GroupId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group_id,
            connected: true,
            profiles: Vec::new(),
        }
    }

    pub fn with_profile(mut self, status: ProfileStatus) -> Self {
        self.profiles.push(status);
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Check if the device exposes an enabled LE Audio profile
    pub fn supports_le_audio(&self) -> bool {
        self.profiles
            .iter()
            .any(|p| p.profile == Profile::LeAudio && p.enabled)
    }

    /// Check if the device can take part in a broadcast
    ///
    /// Besides LE Audio support this requires a valid coordinated-set id,
    /// since sharing is tracked per group.
    pub fn is_sharing_capable(&self) -> bool {
        self.supports_le_audio() && self.group_id.is_valid()
    }

    /// Current connection state of `profile`
    pub fn profile_state(&self, profile: Profile) -> ConnectionState {
        self.profiles
            .iter()
            .find(|p| p.profile == profile)
            .map(|p| p.state)
            .unwrap_or_default()
    }

    /// Check if `profile` is the only connected profile of this device
    pub fn is_first_connected_profile(&self, profile: Profile) -> bool {
        !self
            .profiles
            .iter()
            .any(|p| p.profile != profile && p.state.is_connected())
    }
}

/// One entry of a dialog device list, representing a whole group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceItem {
    pub name: String,
    pub group_id: GroupId,
}

impl DeviceItem {
    pub fn new(name: impl Into<String>, group_id: GroupId) -> Self {
        Self {
            name: name.into(),
            group_id,
        }
    }
}

impl From<&Device> for DeviceItem {
    fn from(device: &Device) -> Self {
        DeviceItem::new(device.name.clone(), device.group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_device(group: i32) -> Device {
        Device::new("AA:01", "Earbuds", GroupId::new(group))
            .with_profile(ProfileStatus::connected(Profile::LeAudio))
    }

    #[test]
    fn test_le_audio_support() {
        assert!(le_device(1).supports_le_audio());
        assert!(le_device(1).is_sharing_capable());

        let classic = Device::new("AA:02", "Buds", GroupId::INVALID)
            .with_profile(ProfileStatus::connected(Profile::A2dp));
        assert!(!classic.supports_le_audio());
    }

    #[test]
    fn test_disabled_le_audio_profile_is_ignored() {
        let device = Device::new("AA:01", "Earbuds", GroupId::new(1)).with_profile(
            ProfileStatus::connected(Profile::LeAudio).disabled(),
        );
        assert!(!device.supports_le_audio());
    }

    #[test]
    fn test_ungrouped_le_device_is_not_sharing_capable() {
        let device = le_device(-1);
        assert!(device.supports_le_audio());
        assert!(!device.is_sharing_capable());
    }

    #[test]
    fn test_first_connected_profile() {
        let device = Device::new("AA:02", "Buds", GroupId::INVALID)
            .with_profile(ProfileStatus::connected(Profile::A2dp))
            .with_profile(ProfileStatus::new(
                Profile::HeadsetHfp,
                ConnectionState::Connecting,
            ));
        assert!(device.is_first_connected_profile(Profile::A2dp));

        let device = device.with_profile(ProfileStatus::connected(Profile::Hearing));
        assert!(!device.is_first_connected_profile(Profile::A2dp));
    }

    #[test]
    fn test_profile_state_defaults_to_disconnected() {
        let device = le_device(1);
        assert_eq!(device.profile_state(Profile::LeAudio), ConnectionState::Connected);
        assert_eq!(device.profile_state(Profile::A2dp), ConnectionState::Disconnected);
    }
}
