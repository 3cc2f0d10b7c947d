//! Identity types for devices and device groups

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for a remote Bluetooth device
///
/// Typically the device address ("AA:BB:CC:DD:EE:FF"),
/// normalized to upper case so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a new DeviceId, normalizing the format
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId::new(s)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        DeviceId::new(s)
    }
}

/// Coordinated-set identifier shared by the members of one logical sink
///
/// Left and right earbuds of one pair carry the same group id and are
/// connected, shared and retracted as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(i32);

impl GroupId {
    /// Group id reported by devices that are not part of a coordinated set
    pub const INVALID: GroupId = GroupId(-1);

    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for GroupId {
    fn from(id: i32) -> Self {
        GroupId::new(id)
    }
}
