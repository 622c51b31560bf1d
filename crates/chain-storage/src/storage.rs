use crate::block_store::SledBlockStore;
use crate::errors::StorageError;
use async_trait::async_trait;
use chain_core::Block;
use chain_crypto::Hash256;

/// Persistence seam for committed blocks, kept separate from the
/// coordinator's in-memory `BlockHistory` (which ordinary reads use).
/// A node persists here so history survives a restart without relying on
/// the backup/restore snapshot path, which only covers world state.
#[async_trait]
pub trait BlockStorage: Send + Sync {
    async fn save_block(&self, block: &Block) -> Result<(), StorageError>;
    async fn get_block_by_hash(&self, hash: &Hash256) -> Result<Option<Block>, StorageError>;
    async fn get_block_by_height(&self, height: u64) -> Result<Option<Block>, StorageError>;
    async fn latest_block(&self) -> Result<Option<Block>, StorageError>;
}

#[async_trait]
impl BlockStorage for SledBlockStore {
    async fn save_block(&self, block: &Block) -> Result<(), StorageError> {
        SledBlockStore::save_block(self, block)
    }

    async fn get_block_by_hash(&self, hash: &Hash256) -> Result<Option<Block>, StorageError> {
        SledBlockStore::get_block_by_hash(self, hash)
    }

    async fn get_block_by_height(&self, height: u64) -> Result<Option<Block>, StorageError> {
        SledBlockStore::get_block_by_height(self, height)
    }

    async fn latest_block(&self) -> Result<Option<Block>, StorageError> {
        SledBlockStore::latest_block(self)
    }
}
