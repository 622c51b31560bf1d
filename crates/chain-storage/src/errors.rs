#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("block not found")]
    NotFound,
    #[error("serialization error")]
    Serialization(#[from] bincode::Error),
    #[error("database error")]
    Database(#[from] sled::Error),
}

/// Errors from the backup/restore subsystem, kept distinct from block/state
/// persistence errors since they cross an external, content-addressed store
/// rather than the local `sled` database.
#[derive(thiserror::Error, Debug)]
pub enum BackupError {
    #[error("snapshot serialization error")]
    Serialization(#[from] serde_json::Error),
    #[error("encryption error: {0}")]
    Encryption(String),
    #[error("ciphertext too short to contain an IV and tag")]
    Truncated,
    #[error("no backup has been taken yet")]
    NoBackupAvailable,
    #[error("cid does not match the most recent index entry")]
    CidMismatch,
    #[error("restore rejected: chain already initialised past genesis; retry with force=true")]
    RestoreNotEmpty,
    #[error("object store has no entry for cid {0}")]
    ObjectMissing(String),
}
