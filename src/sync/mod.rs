//! Snapshot/diff engine
//!
//! Stateless shape transformations over a room's game state: full snapshots,
//! top-level diffs and per-recipient visibility narrowing. Every function reads
//! only its arguments, so any number of rooms may call in concurrently.

mod diff;
mod error;
pub mod session;
pub mod state;
mod visibility;

pub use diff::{apply_diff, diff, Diff};
pub use error::{SnapshotError, SyncError};
pub use session::{Replica, RecipientSync, SyncMessage};
pub use state::{clone_state, deserialize, from_state, serialize, to_state, GameState, Snapshot};
pub use visibility::{compress, VisibilityFilter};
