//! Game Sync Core - state synchronization and timing for multiplayer rooms
//!
//! Every game type on the platform runs on top of two primitives:
//! - `sync`: snapshots, top-level diffs and per-recipient visibility narrowing
//!   of an arbitrary game state
//! - `timing`: pause/resume-aware clocks, countdowns and delays that drive
//!   turn timers, matchmaking searches and round transitions
//!
//! Transport, room bookkeeping and game rules live outside this crate.

pub mod sync;
pub mod timing;
pub mod util;

pub use sync::{
    apply_diff, clone_state, compress, deserialize, diff, from_state, serialize, to_state, Diff,
    GameState, Replica, RecipientSync, Snapshot, SnapshotError, SyncError, SyncMessage,
    VisibilityFilter,
};
pub use timing::{
    sleep, start_countdown, start_countdown_with, Clock, CountdownHandle, CountdownOptions,
};
