//! Per-recipient sync channel: full snapshot on join, diffs afterwards

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::util::time::unix_millis;

use super::diff::{apply_diff, diff, Diff};
use super::error::{SnapshotError, SyncError};
use super::state::GameState;
use super::visibility::{compress, VisibilityFilter};

/// Update sent to one recipient, handed verbatim to the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncMessage {
    /// Complete visible state, resets the receiving replica
    Full {
        seq: u64,
        server_time: u64,
        state: GameState,
    },

    /// Changed top-level fields since the previous message
    Delta {
        seq: u64,
        server_time: u64,
        diff: Diff,
    },
}

impl SyncMessage {
    pub fn seq(&self) -> u64 {
        match self {
            Self::Full { seq, .. } | Self::Delta { seq, .. } => *seq,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }

    /// Encode as a JSON text frame
    pub fn encode(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Encode)
    }

    /// Decode a JSON text frame
    pub fn decode(text: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(text).map_err(|e| {
            warn!(error = %e, bytes = text.len(), "Failed to parse sync message");
            SnapshotError::Malformed(e)
        })
    }
}

/// Server-side view of what one recipient has been sent.
///
/// Keeps a mirror of the recipient's reconstructed state so each update only
/// carries visible fields that changed.
#[derive(Debug, Clone)]
pub struct RecipientSync {
    filter: VisibilityFilter,
    /// What the recipient's replica holds after the last message
    mirror: Option<GameState>,
    next_seq: u64,
}

impl RecipientSync {
    pub fn new(filter: VisibilityFilter) -> Self {
        Self {
            filter,
            mirror: None,
            next_seq: 0,
        }
    }

    pub fn filter(&self) -> &VisibilityFilter {
        &self.filter
    }

    /// Change what the recipient may see. The next message is a full snapshot
    /// so fields hidden by the new filter are dropped from the replica.
    pub fn set_filter(&mut self, filter: VisibilityFilter) {
        self.filter = filter;
        self.request_resync();
    }

    /// Force the next message to be a full snapshot
    pub fn request_resync(&mut self) {
        self.mirror = None;
    }

    pub fn needs_full(&self) -> bool {
        self.mirror.is_none()
    }

    /// Build the next update for this recipient, or `None` if nothing it can
    /// see has changed
    pub fn next_message(&mut self, state: &GameState) -> Option<SyncMessage> {
        let visible = compress(state, &self.filter);

        let message = match &self.mirror {
            None => {
                let visible = visible.into_owned();
                self.mirror = Some(visible.clone());
                SyncMessage::Full {
                    seq: self.take_seq(),
                    server_time: unix_millis(),
                    state: visible,
                }
            }
            Some(mirror) => {
                let changes = diff(mirror, &visible);
                if changes.is_empty() {
                    return None;
                }
                self.mirror = Some(apply_diff(mirror, &changes));
                SyncMessage::Delta {
                    seq: self.take_seq(),
                    server_time: unix_millis(),
                    diff: changes,
                }
            }
        };

        debug!(seq = message.seq(), full = message.is_full(), "Built sync message");
        Some(message)
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl Default for RecipientSync {
    fn default() -> Self {
        Self::new(VisibilityFilter::Full)
    }
}

#[derive(Debug, Clone)]
struct Baseline {
    seq: u64,
    state: GameState,
}

/// Client-side reconstruction of a room's state from sync messages
#[derive(Debug, Clone, Default)]
pub struct Replica {
    baseline: Option<Baseline>,
}

impl Replica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reconstructed state, if a full snapshot has been received
    pub fn state(&self) -> Option<&GameState> {
        self.baseline.as_ref().map(|b| &b.state)
    }

    pub fn last_seq(&self) -> Option<u64> {
        self.baseline.as_ref().map(|b| b.seq)
    }

    /// Drop the reconstructed state; only a full snapshot is accepted next
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    /// Apply one update. A rejected update leaves the replica unchanged.
    pub fn apply(&mut self, message: SyncMessage) -> Result<&GameState, SyncError> {
        match message {
            SyncMessage::Full { seq, state, .. } => {
                let baseline = self.baseline.insert(Baseline { seq, state });
                Ok(&baseline.state)
            }
            SyncMessage::Delta { seq, diff, .. } => {
                let Some(baseline) = self.baseline.as_mut() else {
                    warn!(seq, "Delta received without a baseline");
                    return Err(SyncError::NoBaseline);
                };

                let Some(expected) = baseline.seq.checked_add(1) else {
                    warn!(last = baseline.seq, "Delta after final sequence number");
                    return Err(SyncError::SeqExhausted { last: baseline.seq });
                };
                if seq != expected {
                    warn!(expected, got = seq, "Out-of-order delta");
                    return Err(SyncError::OutOfOrder { expected, got: seq });
                }

                baseline.state = apply_diff(&baseline.state, &diff);
                baseline.seq = seq;
                Ok(&baseline.state)
            }
        }
    }

    /// Decode and apply one transport frame
    pub fn apply_text(&mut self, text: &str) -> Result<&GameState, SyncError> {
        let message = SyncMessage::decode(text)?;
        self.apply(message)
    }
}
