use crate::errors::StorageError;
use chain_core::ChainSnapshot;
use sled::Db;

const SNAPSHOT_KEY: &[u8] = b"snapshot:latest";

/// Local, unencrypted checkpoint of coordinator state, written on every
/// commit so a restarted node can resume without waiting on the remote
/// backup store. Distinct from `chain-consensus::BackupTrigger`, which
/// targets the external, encrypted, content-addressed store.
pub struct StateStore {
    tree: sled::Tree,
}

impl StateStore {
    pub fn new(db: &Db) -> Result<Self, StorageError> {
        Ok(Self { tree: db.open_tree("state")? })
    }

    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(key, value)?;
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }

    pub fn save_snapshot(&self, snapshot: &ChainSnapshot) -> Result<(), StorageError> {
        let bytes = bincode::serialize(snapshot)?;
        self.tree.insert(SNAPSHOT_KEY, bytes)?;
        Ok(())
    }

    pub fn load_snapshot(&self) -> Result<Option<ChainSnapshot>, StorageError> {
        match self.tree.get(SNAPSHOT_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{ConsensusConfig, WorldState};
    use chain_crypto::KeyPair;

    #[test]
    fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = StateStore::new(&db).unwrap();

        assert!(store.load_snapshot().unwrap().is_none());

        let snapshot = ChainSnapshot {
            world_state: WorldState::new(),
            config: ConsensusConfig::new(vec![], KeyPair::generate().public_key(), 5_000, 60_000),
            latest_height: 0,
        };
        store.save_snapshot(&snapshot).unwrap();
        let loaded = store.load_snapshot().unwrap().unwrap();
        assert_eq!(loaded.latest_height, 0);
    }

    #[test]
    fn raw_get_set_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = StateStore::new(&db).unwrap();

        store.set(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.get(b"missing").unwrap(), None);
    }
}
