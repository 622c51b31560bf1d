use async_trait::async_trait;
use chain_core::ChainSnapshot;

/// The coordinator's view of the backup subsystem: "schedule a snapshot
/// upload, off the write path". `chain-storage` provides the real
/// implementation (encrypt + upload + index); nothing in this crate reaches
/// into storage internals, keeping the ownership graph acyclic.
#[async_trait]
pub trait BackupTrigger: Send + Sync {
    async fn trigger_backup(&self, snapshot: ChainSnapshot);

    /// The `cid` of the most recent backup-index entry, for the anti-rollback
    /// check a restore must pass. `None` when no backup has ever been taken.
    async fn latest_backup_cid(&self) -> Option<String>;
}

/// Used where no backup store is configured (e.g. most tests).
pub struct NoopBackup;

#[async_trait]
impl BackupTrigger for NoopBackup {
    async fn trigger_backup(&self, _snapshot: ChainSnapshot) {}

    async fn latest_backup_cid(&self) -> Option<String> {
        None
    }
}
