//! Broadcast receive state reported by the broadcast assistant

use serde::{Deserialize, Serialize};

/// Identifier of a broadcast source on a sink
pub type SourceId = u32;

/// One broadcast source known to a sink device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveState {
    pub source_id: SourceId,
    /// BIS sync bitmask per subgroup; any non-zero entry means the sink is synced
    pub bis_sync: Vec<u32>,
}

impl ReceiveState {
    pub fn new(source_id: SourceId, bis_sync: Vec<u32>) -> Self {
        Self { source_id, bis_sync }
    }

    /// A receive state with a single synced subgroup
    pub fn synced(source_id: SourceId) -> Self {
        Self::new(source_id, vec![1])
    }

    /// Check if this sink is actively receiving the broadcast
    pub fn is_synced(&self) -> bool {
        self.bis_sync.iter().any(|&bits| bits != 0)
    }
}

/// Metadata needed to point a sink at the local broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMetadata {
    pub broadcast_id: u32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synced_state() {
        assert!(ReceiveState::synced(1).is_synced());
        assert!(ReceiveState::new(1, vec![0, 4]).is_synced());
    }

    #[test]
    fn test_unsynced_state() {
        assert!(!ReceiveState::new(1, vec![]).is_synced());
        assert!(!ReceiveState::new(1, vec![0, 0]).is_synced());
    }
}
