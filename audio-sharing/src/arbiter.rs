//! Dialog arbitration
//!
//! A pure decision over a [`Classification`] and the current
//! [`SharingSession`]. Nothing is remembered between calls.
//!
//! Rules, first match wins:
//!
//! | condition | action |
//! |---|---|
//! | not the device's first connected profile | `NoOp` |
//! | device snapshot unavailable | `NoOp` |
//! | in a call | `SetActive` |
//! | classic device, no sharing | `SetActive` |
//! | classic device, sharing | `ShowStopDialog` |
//! | LE device, no sharing, at most one LE group connected | `SetActive` |
//! | LE device, sharing, own group already receives the broadcast | `AutoJoin` |
//! | LE device, sharing, other sharing groups at the cap | `ShowDisconnectDialog` |
//! | LE device, otherwise | `ShowJoinDialog` |

use sharing_state::{DeviceId, DeviceItem, GroupId, SharingSession};

use crate::classifier::{Classification, DeviceCapability};
use crate::config::SharingConfig;
use crate::dialog::DialogTag;

/// The single thing to do in response to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NoOp,
    /// Make the device the active audio output
    SetActive(DeviceId),
    /// Add the running broadcast to the device without asking
    AutoJoin { device: DeviceId, group_id: GroupId },
    /// Ask whether to stop sharing in favor of a device that cannot join
    ShowStopDialog {
        device_name: String,
        sharing_devices: Vec<DeviceItem>,
    },
    /// Ask whether to share with the newly connected device
    ShowJoinDialog {
        device_name: String,
        candidates: Vec<DeviceItem>,
    },
    /// Ask which sharing group to drop for the newly connected device
    ShowDisconnectDialog {
        device_name: String,
        sharing_devices: Vec<DeviceItem>,
    },
}

impl Action {
    /// The dialog this action shows, if any
    pub fn dialog_tag(&self) -> Option<DialogTag> {
        match self {
            Action::ShowStopDialog { .. } => Some(DialogTag::Stop),
            Action::ShowJoinDialog { .. } => Some(DialogTag::Join),
            Action::ShowDisconnectDialog { .. } => Some(DialogTag::Disconnect),
            Action::NoOp | Action::SetActive(_) | Action::AutoJoin { .. } => None,
        }
    }

    /// Dialog list payload, empty for non-dialog actions
    pub fn dialog_items(&self) -> &[DeviceItem] {
        match self {
            Action::ShowStopDialog {
                sharing_devices, ..
            }
            | Action::ShowDisconnectDialog {
                sharing_devices, ..
            } => sharing_devices,
            Action::ShowJoinDialog { candidates, .. } => candidates,
            Action::NoOp | Action::SetActive(_) | Action::AutoJoin { .. } => &[],
        }
    }
}

/// Knobs of the decision table, taken from [`SharingConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterPolicy {
    pub max_sharing_groups: usize,
    pub auto_join_group_members: bool,
    pub respect_call_state: bool,
}

impl Default for ArbiterPolicy {
    fn default() -> Self {
        Self::from(&SharingConfig::default())
    }
}

impl From<&SharingConfig> for ArbiterPolicy {
    fn from(config: &SharingConfig) -> Self {
        Self {
            max_sharing_groups: config.max_sharing_groups,
            auto_join_group_members: config.auto_join_group_members,
            respect_call_state: config.respect_call_state,
        }
    }
}

/// Pick the action for a classified connection
pub fn arbitrate(
    classification: &Classification,
    session: &SharingSession,
    policy: &ArbiterPolicy,
) -> Action {
    if !classification.first_connection || !classification.snapshot_ready {
        return Action::NoOp;
    }

    let device = &classification.device_id;
    if policy.respect_call_state && classification.in_call {
        return Action::SetActive(device.clone());
    }

    let sharing = session.is_enabled();
    match classification.capability {
        DeviceCapability::Classic if !sharing => Action::SetActive(device.clone()),
        DeviceCapability::Classic => Action::ShowStopDialog {
            device_name: classification.device_name.clone(),
            sharing_devices: classification.other_sharing_groups.clone(),
        },
        DeviceCapability::LeAudio if !sharing => {
            if classification.connected_group_count <= 1 {
                Action::SetActive(device.clone())
            } else {
                Action::ShowJoinDialog {
                    device_name: classification.device_name.clone(),
                    candidates: classification.other_groups.clone(),
                }
            }
        }
        DeviceCapability::LeAudio => {
            if policy.auto_join_group_members
                && session.is_group_sharing(classification.group_id)
            {
                return Action::AutoJoin {
                    device: device.clone(),
                    group_id: classification.group_id,
                };
            }
            // Zero sharing groups while enabled means the broadcast just started
            // and no sink has synced yet; that still goes to the join dialog.
            if classification.other_sharing_groups.len() >= policy.max_sharing_groups {
                Action::ShowDisconnectDialog {
                    device_name: classification.device_name.clone(),
                    sharing_devices: classification.other_sharing_groups.clone(),
                }
            } else {
                Action::ShowJoinDialog {
                    device_name: classification.device_name.clone(),
                    candidates: classification.other_sharing_groups.clone(),
                }
            }
        }
    }
}
