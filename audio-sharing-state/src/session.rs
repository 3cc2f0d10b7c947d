//! Sharing session state
//!
//! A sharing session is never stored. It is derived on every decision from
//! the broadcast profile and the current device snapshot.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::model::{BroadcastMetadata, GroupId};
use crate::profile::BroadcastProfile;
use crate::snapshot::ConnectedGroups;

/// Derived view of the audio sharing session
///
/// `enabled == false` always comes with an empty `sharing_group_ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharingSession {
    enabled: bool,
    sharing_group_ids: BTreeSet<GroupId>,
}

impl SharingSession {
    /// A session with no broadcast running
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Build a session from explicit group ids
    ///
    /// The ids are dropped when `enabled` is false.
    pub fn new(enabled: bool, sharing_group_ids: impl IntoIterator<Item = GroupId>) -> Self {
        let sharing_group_ids = if enabled {
            sharing_group_ids.into_iter().collect()
        } else {
            BTreeSet::new()
        };
        Self {
            enabled,
            sharing_group_ids,
        }
    }

    /// Build a session from the broadcast flag and the connected groups
    pub fn from_groups(enabled: bool, groups: &ConnectedGroups) -> Self {
        Self::new(enabled, groups.sharing_groups().map(|g| g.group_id))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn sharing_group_ids(&self) -> &BTreeSet<GroupId> {
        &self.sharing_group_ids
    }

    pub fn is_group_sharing(&self, group_id: GroupId) -> bool {
        self.sharing_group_ids.contains(&group_id)
    }
}

/// Answers whether an audio sharing broadcast is running
#[derive(Clone, Default)]
pub struct SharingSessionState {
    broadcast: Option<Arc<dyn BroadcastProfile>>,
}

impl SharingSessionState {
    /// Create the state; `broadcast` is `None` until the proxy is bound
    pub fn new(broadcast: Option<Arc<dyn BroadcastProfile>>) -> Self {
        Self { broadcast }
    }

    pub fn broadcast(&self) -> Option<&Arc<dyn BroadcastProfile>> {
        self.broadcast.as_ref()
    }

    /// Check if a broadcast is active
    ///
    /// An unbound profile reads as "not broadcasting".
    pub fn is_broadcast_active(&self) -> bool {
        self.broadcast.as_ref().is_some_and(|b| b.is_enabled())
    }

    pub fn latest_metadata(&self) -> Option<BroadcastMetadata> {
        self.broadcast.as_ref().and_then(|b| b.latest_metadata())
    }

    /// Derive the current session from a device snapshot
    pub fn session(&self, groups: &ConnectedGroups) -> SharingSession {
        SharingSession::from_groups(self.is_broadcast_active(), groups)
    }
}

impl std::fmt::Debug for SharingSessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharingSessionState")
            .field("broadcast_bound", &self.broadcast.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestBroadcast {
        enabled: AtomicBool,
    }

    impl BroadcastProfile for TestBroadcast {
        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }

        fn start_private_broadcast(&self) -> Result<()> {
            self.enabled.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop_latest_broadcast(&self) -> Result<()> {
            self.enabled.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn latest_metadata(&self) -> Option<BroadcastMetadata> {
            None
        }
    }

    #[test]
    fn test_unbound_profile_is_not_broadcasting() {
        let state = SharingSessionState::new(None);
        assert!(!state.is_broadcast_active());
        assert!(state.latest_metadata().is_none());
        assert_eq!(state.session(&ConnectedGroups::new()), SharingSession::inactive());
    }

    #[test]
    fn test_broadcast_flag_follows_profile() {
        let broadcast = Arc::new(TestBroadcast {
            enabled: AtomicBool::new(false),
        });
        let state = SharingSessionState::new(Some(broadcast.clone()));
        assert!(!state.is_broadcast_active());

        broadcast.start_private_broadcast().unwrap();
        assert!(state.is_broadcast_active());
        let session = state.session(&ConnectedGroups::new());
        assert!(session.is_enabled());
        assert!(session.sharing_group_ids().is_empty());
    }

    #[test]
    fn test_disabled_session_has_no_groups() {
        let session = SharingSession::new(false, [GroupId::new(1)]);
        assert!(!session.is_enabled());
        assert!(session.sharing_group_ids().is_empty());
    }

    #[test]
    fn test_enabled_session_keeps_groups() {
        let session = SharingSession::new(true, [GroupId::new(1), GroupId::new(2)]);
        assert_eq!(session.sharing_group_ids().len(), 2);
        assert!(session.is_group_sharing(GroupId::new(2)));
        assert!(!session.is_group_sharing(GroupId::new(3)));
    }
}
