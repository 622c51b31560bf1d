use crate::config::ConsensusConfig;
use crate::state::WorldState;
use serde::{Deserialize, Serialize};

/// A point-in-time copy of coordinator state, serialized, encrypted and
/// uploaded to the external backup store on a fixed cadence. Intentionally
/// does not include the pending queue or full history — those are
/// reconstructable from replaying committed blocks, which the backup store
/// does not need to carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub world_state: WorldState,
    pub config: ConsensusConfig,
    pub latest_height: u64,
}
