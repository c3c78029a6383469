//! Error types for snapshot decoding and replica reconstruction

/// Snapshot encode/decode errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Snapshot is not a state mapping (found {found})")]
    NotAnObject { found: &'static str },

    #[error("Failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("State does not match the expected game type: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Replica errors. Every variant means the receiving side has to be sent a
/// full snapshot before incremental updates can be applied again.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("State resync required: delta received before any full snapshot")]
    NoBaseline,

    #[error("State resync required: expected update {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },

    #[error("State resync required: update sequence exhausted after {last}")]
    SeqExhausted { last: u64 },

    #[error("State resync required: {0}")]
    Snapshot(#[from] SnapshotError),
}
