use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. The coordinator's timestamps and
/// timeouts are all measured against this.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as u64
}
