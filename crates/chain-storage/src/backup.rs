use crate::errors::BackupError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use chain_consensus::BackupTrigger;
use chain_core::ChainSnapshot;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, BackupError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let mut ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| BackupError::Encryption(e.to_string()))?;
    let mut out = nonce_bytes.to_vec();
    out.append(&mut ciphertext);
    Ok(out)
}

fn decrypt(key: &[u8; 32], blob: &[u8]) -> Result<Vec<u8>, BackupError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(BackupError::Truncated);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| BackupError::Encryption(e.to_string()))
}

fn cid_of(ciphertext: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ciphertext);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub cid: String,
    pub height: u64,
    pub timestamp_ms: u64,
}

/// External content-addressed blob store the backup service uploads
/// ciphertext to. `InMemoryObjectStore` is the only implementation shipped:
/// a real S3/IPFS client would implement this trait without changing
/// `BackupService`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, cid: &str, bytes: Vec<u8>);
    async fn get(&self, cid: &str) -> Option<Vec<u8>>;
    async fn remove(&self, cid: &str);
}

/// External key-value store holding the `{cid, height, timestamp}` index
/// list used to find and evict old backups.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn push(&self, entry: IndexEntry);
    async fn latest(&self) -> Option<IndexEntry>;
    /// Returns entries beyond the most recent `keep` so the caller can
    /// unpin their backing objects.
    async fn evict_beyond(&self, keep: usize) -> Vec<IndexEntry>;
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, cid: &str, bytes: Vec<u8>) {
        self.objects.lock().await.insert(cid.to_string(), bytes);
    }

    async fn get(&self, cid: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(cid).cloned()
    }

    async fn remove(&self, cid: &str) {
        self.objects.lock().await.remove(cid);
    }
}

#[derive(Default)]
pub struct InMemoryIndexStore {
    entries: Mutex<Vec<IndexEntry>>,
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn push(&self, entry: IndexEntry) {
        self.entries.lock().await.push(entry);
    }

    async fn latest(&self) -> Option<IndexEntry> {
        self.entries.lock().await.last().cloned()
    }

    async fn evict_beyond(&self, keep: usize) -> Vec<IndexEntry> {
        let mut entries = self.entries.lock().await;
        if entries.len() <= keep {
            return Vec::new();
        }
        let cutoff = entries.len() - keep;
        entries.drain(0..cutoff).collect()
    }
}

/// Encrypts and uploads `ChainSnapshot`s on the cadence `chain-consensus`
/// drives (after each commit past `backup_interval_ms`, and opportunistically
/// on idle watchdog), and restores them back under the anti-rollback rule.
pub struct BackupService {
    object_store: Arc<dyn ObjectStore>,
    index_store: Arc<dyn IndexStore>,
    encryption_key: [u8; 32],
    ttl: usize,
}

impl BackupService {
    pub fn new(object_store: Arc<dyn ObjectStore>, index_store: Arc<dyn IndexStore>, encryption_key: [u8; 32]) -> Self {
        Self { object_store, index_store, encryption_key, ttl: 10 }
    }

    pub fn with_ttl(mut self, ttl: usize) -> Self {
        self.ttl = ttl;
        self
    }

    async fn unpin_expired(&self) {
        for stale in self.index_store.evict_beyond(self.ttl).await {
            self.object_store.remove(&stale.cid).await;
        }
    }

    /// Accepts `{cid, force}`; `current_latest_height` stands in for the
    /// caller's `worldState.latestHeight == 0` check.
    pub async fn restore(&self, cid: &str, force: bool, current_latest_height: u64) -> Result<ChainSnapshot, BackupError> {
        if current_latest_height != 0 && !force {
            return Err(BackupError::RestoreNotEmpty);
        }
        let latest = self.index_store.latest().await.ok_or(BackupError::NoBackupAvailable)?;
        if latest.cid != cid {
            return Err(BackupError::CidMismatch);
        }
        let blob = self
            .object_store
            .get(cid)
            .await
            .ok_or_else(|| BackupError::ObjectMissing(cid.to_string()))?;
        let plaintext = decrypt(&self.encryption_key, &blob)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    pub async fn latest_index_entry(&self) -> Option<IndexEntry> {
        self.index_store.latest().await
    }
}

#[async_trait]
impl BackupTrigger for BackupService {
    async fn trigger_backup(&self, snapshot: ChainSnapshot) {
        let height = snapshot.latest_height;
        let plaintext = match serde_json::to_vec(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize snapshot for backup");
                return;
            }
        };
        let ciphertext = match encrypt(&self.encryption_key, &plaintext) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encrypt snapshot for backup");
                return;
            }
        };
        let cid = cid_of(&ciphertext);
        self.object_store.put(&cid, ciphertext).await;
        self.index_store
            .push(IndexEntry { cid: cid.clone(), height, timestamp_ms: chain_consensus::now_ms() })
            .await;
        tracing::info!(height, cid = %cid, "uploaded backup snapshot");
        self.unpin_expired().await;
    }

    async fn latest_backup_cid(&self) -> Option<String> {
        self.index_store.latest().await.map(|entry| entry.cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{ConsensusConfig, WorldState};
    use chain_crypto::KeyPair;

    fn service() -> BackupService {
        BackupService::new(Arc::new(InMemoryObjectStore::new()), Arc::new(InMemoryIndexStore::new()), [7u8; 32])
    }

    fn sample_snapshot(height: u64) -> ChainSnapshot {
        let config = ConsensusConfig::new(vec![], KeyPair::generate().public_key(), 5_000, 60_000);
        ChainSnapshot { world_state: WorldState::new(), config, latest_height: height }
    }

    #[tokio::test]
    async fn round_trips_through_encryption() {
        let service = service();
        service.trigger_backup(sample_snapshot(3)).await;
        let entry = service.latest_index_entry().await.unwrap();

        let restored = service.restore(&entry.cid, false, 0).await.unwrap();
        assert_eq!(restored.latest_height, 3);
    }

    #[tokio::test]
    async fn restore_rejects_mismatched_cid() {
        let service = service();
        service.trigger_backup(sample_snapshot(1)).await;

        let err = service.restore("0000", false, 0).await.unwrap_err();
        assert!(matches!(err, BackupError::CidMismatch));
    }

    #[tokio::test]
    async fn restore_rejects_nonempty_chain_without_force() {
        let service = service();
        service.trigger_backup(sample_snapshot(1)).await;
        let entry = service.latest_index_entry().await.unwrap();

        let err = service.restore(&entry.cid, false, 42).await.unwrap_err();
        assert!(matches!(err, BackupError::RestoreNotEmpty));

        let ok = service.restore(&entry.cid, true, 42).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn ttl_unpins_oldest_backups() {
        let service = service().with_ttl(2);
        service.trigger_backup(sample_snapshot(0)).await;
        let evicted_cid = service.latest_index_entry().await.unwrap().cid;
        for h in 1..5 {
            service.trigger_backup(sample_snapshot(h)).await;
        }
        let latest = service.latest_index_entry().await.unwrap();
        assert_eq!(latest.height, 4);
        // Height 0's ciphertext should have been unpinned from the object
        // store once it fell outside the last `ttl` entries in the index.
        assert!(service.object_store.get(&evicted_cid).await.is_none());
    }
}
