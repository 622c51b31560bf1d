use crate::errors::StorageError;
use chain_core::Block;
use sled::Db;

/// Committed blocks keyed by height, with a secondary hash→height index so a
/// block can be looked up either way without storing it twice.
pub struct SledBlockStore {
    by_height: sled::Tree,
    by_hash: sled::Tree,
}

impl SledBlockStore {
    pub fn new(db: &Db) -> Result<Self, StorageError> {
        Ok(Self {
            by_height: db.open_tree("blocks_by_height")?,
            by_hash: db.open_tree("blocks_by_hash")?,
        })
    }

    fn height_key(height: u64) -> [u8; 8] {
        height.to_be_bytes()
    }

    pub fn save_block(&self, block: &Block) -> Result<(), StorageError> {
        let key = Self::height_key(block.header.height);
        let bytes = bincode::serialize(block)?;
        self.by_height.insert(key, bytes)?;
        self.by_hash.insert(block.hash.as_bytes(), &key)?;
        Ok(())
    }

    pub fn get_block_by_height(&self, height: u64) -> Result<Option<Block>, StorageError> {
        match self.by_height.get(Self::height_key(height))? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    pub fn get_block_by_hash(&self, hash: &chain_crypto::Hash256) -> Result<Option<Block>, StorageError> {
        match self.by_hash.get(hash.as_bytes())? {
            Some(height_bytes) => match self.by_height.get(&height_bytes)? {
                Some(data) => Ok(Some(bincode::deserialize(&data)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    pub fn latest_block(&self) -> Result<Option<Block>, StorageError> {
        match self.by_height.last()? {
            Some((_, data)) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::BlockHeader;
    use chain_crypto::Hash256;

    fn sample_block(height: u64) -> Block {
        Block::new(
            BlockHeader {
                height,
                timestamp_ms: 1,
                prev_hash: Hash256::zero(),
                tx_root: Hash256::digest(b""),
                state_root: Hash256::digest(b""),
                proposer: "p".into(),
                tx_count: 0,
            },
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn round_trips_by_height_and_hash() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledBlockStore::new(&db).unwrap();

        let block = sample_block(1);
        store.save_block(&block).unwrap();

        assert_eq!(store.get_block_by_height(1).unwrap().unwrap().hash, block.hash);
        assert_eq!(store.get_block_by_hash(&block.hash).unwrap().unwrap().header.height, 1);
        assert!(store.get_block_by_height(2).unwrap().is_none());
    }

    #[test]
    fn latest_block_tracks_highest_height() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledBlockStore::new(&db).unwrap();

        for h in 1..=5 {
            store.save_block(&sample_block(h)).unwrap();
        }
        assert_eq!(store.latest_block().unwrap().unwrap().header.height, 5);
    }
}
