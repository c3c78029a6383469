//! Sync Demo - simulated room broadcaster on top of the sync core
//!
//! Plays one scripted grid-game round between two players and ships every
//! state change through per-recipient sync channels:
//! - round countdown banner before the first move
//! - turn clock per move, paused while a player is disconnected
//! - hidden per-player hands narrowed out of the opponent's view
//! - a dropped frame that the receiving replica recovers from via resync

mod config;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use game_sync_core::{
    sleep, start_countdown_with, to_state, Clock, CountdownOptions, GameState, RecipientSync,
    Replica, VisibilityFilter,
};

use crate::config::Config;

/// Scripted moves (row, col), alternating X then O
const MOVES: [(usize, usize); 5] = [(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)];
/// Move index during which O disconnects and X's turn clock is paused
const DISCONNECT_AT: usize = 2;
/// Move index whose frame to O is dropped in transit
const DROP_FRAME_AT: usize = 3;
const THINK_TIME: Duration = Duration::from_millis(200);
const DISCONNECT_TIME: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum Mark {
    X,
    O,
}

impl Mark {
    fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    fn hand_key(self) -> String {
        format!("hand_{self:?}")
    }
}

/// Typed room state owned by the game module
#[derive(Debug, Serialize)]
struct GridRoom {
    board: [[Option<Mark>; 3]; 3],
    turn: Mark,
    winner: Option<Mark>,
    /// Hidden per-player hands, flattened to `hand_X` / `hand_O`
    #[serde(flatten)]
    hands: BTreeMap<String, Vec<u8>>,
}

impl GridRoom {
    fn new() -> Self {
        let hands = [Mark::X, Mark::O]
            .into_iter()
            .map(|mark| (mark.hand_key(), vec![1, 2, 3]))
            .collect();
        Self {
            board: [[None; 3]; 3],
            turn: Mark::X,
            winner: None,
            hands,
        }
    }

    fn play(&mut self, row: usize, col: usize) {
        let mark = self.turn;
        self.board[row][col] = Some(mark);
        if let Some(hand) = self.hands.get_mut(&mark.hand_key()) {
            hand.rotate_left(1);
        }
        if self.has_line(mark) {
            self.winner = Some(mark);
        }
        self.turn = mark.other();
    }

    fn has_line(&self, mark: Mark) -> bool {
        let b = &self.board;
        let at = |r: usize, c: usize| b[r][c] == Some(mark);
        (0..3).any(|i| (0..3).all(|j| at(i, j)) || (0..3).all(|j| at(j, i)))
            || (0..3).all(|i| at(i, i))
            || (0..3).all(|i| at(i, 2 - i))
    }
}

/// Server-side connection to one player
struct Recipient {
    player_id: Uuid,
    mark: Mark,
    sync: RecipientSync,
    frames: mpsc::Sender<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    info!("Starting sync demo");
    info!(
        turn_limit_ms = config.turn_limit.as_millis() as u64,
        countdown_ms = config.round_countdown.as_millis() as u64,
        "Room configuration"
    );

    run_room(&config).await?;

    info!("Sync demo complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

async fn run_room(config: &Config) -> anyhow::Result<()> {
    let mut room = GridRoom::new();
    let (resync_tx, mut resync_rx) = mpsc::channel::<Uuid>(16);

    let mut recipients = Vec::new();
    let mut clients = Vec::new();
    for mark in [Mark::X, Mark::O] {
        let player_id = Uuid::new_v4();
        let (frames_tx, frames_rx) = mpsc::channel::<String>(64);
        // Shared board plus the player's own hand
        let mut visible = ["board", "turn", "winner"].map(String::from).to_vec();
        visible.push(mark.hand_key());
        let filter = VisibilityFilter::Fields(visible);

        recipients.push(Recipient {
            player_id,
            mark,
            sync: RecipientSync::new(filter),
            frames: frames_tx,
        });
        clients.push(tokio::spawn(run_client(player_id, mark, frames_rx, resync_tx.clone())));
        info!(player_id = %player_id, mark = ?mark, "Player joined room");
    }
    drop(resync_tx);

    // Initial full snapshots
    broadcast(&to_state(&room)?, &mut recipients, None).await;

    round_countdown(config).await;

    let mut turn_clock = Clock::new();
    for (index, &(row, col)) in MOVES.iter().enumerate() {
        turn_clock.start();

        sleep(THINK_TIME).await;
        if index == DISCONNECT_AT {
            warn!(mark = ?room.turn.other(), "Opponent disconnected, pausing turn clock");
            turn_clock.pause();
            sleep(DISCONNECT_TIME).await;
            turn_clock.resume();
            info!("Opponent reconnected, resuming turn clock");
        }

        if turn_clock.has_elapsed(config.turn_limit) {
            warn!(mark = ?room.turn, "Turn timed out");
            break;
        }
        info!(
            mark = ?room.turn,
            row,
            col,
            turn_secs = turn_clock.elapsed_secs(),
            "Move played"
        );
        room.play(row, col);

        drain_resyncs(&mut resync_rx, &mut recipients);

        let dropped = (index == DROP_FRAME_AT).then_some(Mark::O);
        broadcast(&to_state(&room)?, &mut recipients, dropped).await;

        if let Some(winner) = room.winner {
            info!(winner = ?winner, "Round over");
            break;
        }
    }

    // Give clients a moment to report, then flush any pending resyncs
    sleep(Duration::from_millis(50)).await;
    drain_resyncs(&mut resync_rx, &mut recipients);
    broadcast(&to_state(&room)?, &mut recipients, None).await;

    // Closing the frame channels ends the client tasks
    recipients.clear();
    for client in clients {
        let (mark, replica) = client.await?;
        match replica.state() {
            Some(state) => info!(
                mark = ?mark,
                seq = ?replica.last_seq(),
                view = %serde_json::Value::Object(state.clone()),
                "Final client view"
            ),
            None => warn!(mark = ?mark, "Client never received a snapshot"),
        }
    }

    Ok(())
}

/// Mark recipients whose replica reported a gap for a full resend
fn drain_resyncs(resync_rx: &mut mpsc::Receiver<Uuid>, recipients: &mut [Recipient]) {
    while let Ok(player_id) = resync_rx.try_recv() {
        if let Some(r) = recipients.iter_mut().find(|r| r.player_id == player_id) {
            info!(player_id = %player_id, "Resending full snapshot");
            r.sync.request_resync();
        }
    }
}

async fn round_countdown(config: &Config) {
    let (done_tx, done_rx) = oneshot::channel();
    let options = CountdownOptions {
        tick_interval: config.countdown_tick,
    };

    let countdown = start_countdown_with(
        config.round_countdown,
        options,
        |remaining| info!(remaining_ms = remaining.as_millis() as u64, "Round starting soon"),
        move || {
            let _ = done_tx.send(());
        },
    );

    if done_rx.await.is_err() {
        error!("Round countdown dropped before completing");
    }
    debug!(remaining_ms = countdown.remaining().as_millis() as u64, "Round countdown finished");
}

/// Ship the current state to every recipient; `drop_for` simulates a lost frame
async fn broadcast(state: &GameState, recipients: &mut [Recipient], drop_for: Option<Mark>) {
    for r in recipients.iter_mut() {
        let Some(message) = r.sync.next_message(state) else {
            continue;
        };

        let frame = match message.encode() {
            Ok(frame) => frame,
            Err(e) => {
                error!(player_id = %r.player_id, error = %e, "Failed to encode sync message");
                continue;
            }
        };

        if drop_for == Some(r.mark) {
            warn!(player_id = %r.player_id, seq = message.seq(), "Simulated frame loss");
            continue;
        }

        if r.frames.send(frame).await.is_err() {
            warn!(player_id = %r.player_id, "Client channel closed");
        }
    }
}

async fn run_client(
    player_id: Uuid,
    mark: Mark,
    mut frames: mpsc::Receiver<String>,
    resync_tx: mpsc::Sender<Uuid>,
) -> (Mark, Replica) {
    let mut replica = Replica::new();

    while let Some(frame) = frames.recv().await {
        match replica.apply_text(&frame) {
            Ok(state) => {
                debug!(
                    player_id = %player_id,
                    fields = state.len(),
                    bytes = frame.len(),
                    "Replica updated"
                );
            }
            Err(e) => {
                warn!(player_id = %player_id, error = %e, "Replica out of sync");
                let _ = resync_tx.send(player_id).await;
            }
        }
    }

    (mark, replica)
}
