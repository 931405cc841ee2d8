//! In-progress run snapshots
//!
//! A snapshot is written every few seconds while playing and read back when
//! the player starts from the menu. Anything wrong with it (missing, not
//! JSON, too old, storage failure) just means a fresh run.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::{KeyValueStore, StorageError};
use crate::consts::*;
use crate::sim::{GameState, Obstacle, Platform};

/// Storage key for the run snapshot
pub const SNAPSHOT_KEY: &str = "pwa-runner-game-state";

/// Why a snapshot could not be used
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no saved game")]
    Missing,

    #[error("saved game is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("saved game expired ({age_ms} ms old)")]
    Expired { age_ms: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Position> for Vec2 {
    fn from(p: Position) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Serialized run, as stored under `SNAPSHOT_KEY`
///
/// Every field but `timestamp` is optional on read; missing values fall
/// back to the fresh-run defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub score: Option<u64>,
    #[serde(default)]
    pub high_score: Option<u64>,
    #[serde(default)]
    pub lives: Option<i32>,
    #[serde(default)]
    pub player_pos: Option<Position>,
    #[serde(default)]
    pub camera_x: Option<f32>,
    /// Unix time (ms) when written
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacles: Option<Vec<Obstacle>>,
}

impl Snapshot {
    /// Capture the current run
    pub fn capture(state: &GameState, now_ms: i64) -> Self {
        Self {
            score: Some(state.score),
            high_score: Some(state.high_score),
            lives: Some(state.lives),
            player_pos: Some(state.player.pos.into()),
            camera_x: Some(state.camera_x),
            timestamp: now_ms,
            platforms: Some(state.platforms.clone()),
            obstacles: Some(state.obstacles.clone()),
        }
    }

    /// Milliseconds since the snapshot was taken. Saturates, so a garbage
    /// timestamp reads as ancient instead of overflowing.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp)
    }

    /// Is this snapshot recent enough to resume?
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) < SNAPSHOT_MAX_AGE_MS
    }

    /// Apply onto a freshly reset run.
    ///
    /// Without saved platforms the world is rebuilt around the restored
    /// camera so there is ground under the player.
    pub fn restore_into(self, state: &mut GameState) {
        state.score = self.score.unwrap_or(state.score);
        state.lives = match self.lives {
            Some(lives) if lives > 0 => lives.min(STARTING_LIVES),
            _ => state.lives,
        };
        state.camera_x = self.camera_x.unwrap_or(state.camera_x);
        if let Some(pos) = self.player_pos {
            state.player.pos = pos.into();
        }

        match self.platforms {
            Some(platforms) => {
                state.platforms = platforms;
                state.obstacles = self.obstacles.unwrap_or_default();
            }
            None => {
                state.lay_out_world(state.camera_x);
                if let Some(obstacles) = self.obstacles {
                    state.obstacles = obstacles;
                }
            }
        }

        for id in state
            .platforms
            .iter()
            .map(|p| &p.id)
            .chain(state.obstacles.iter().map(|o| &o.id))
        {
            state.level.reserve_id(id);
        }
    }
}

/// Write the current run, replacing any earlier snapshot
pub fn save<S: KeyValueStore>(store: &mut S, state: &GameState, now_ms: i64) -> Result<(), PersistError> {
    let json = serde_json::to_string(&Snapshot::capture(state, now_ms))?;
    store.set(SNAPSHOT_KEY, &json)?;
    Ok(())
}

/// Read the snapshot, reporting exactly why it is unusable
pub fn try_load<S: KeyValueStore>(store: &S, now_ms: i64) -> Result<Snapshot, PersistError> {
    let json = store.get(SNAPSHOT_KEY)?.ok_or(PersistError::Missing)?;
    let snapshot: Snapshot = serde_json::from_str(&json)?;
    if !snapshot.is_fresh(now_ms) {
        return Err(PersistError::Expired {
            age_ms: snapshot.age_ms(now_ms),
        });
    }
    Ok(snapshot)
}

/// Read the snapshot; any failure is a miss
pub fn load<S: KeyValueStore>(store: &S, now_ms: i64) -> Option<Snapshot> {
    match try_load(store, now_ms) {
        Ok(snapshot) => Some(snapshot),
        Err(PersistError::Missing) => {
            log::debug!("No saved game");
            None
        }
        Err(e) => {
            log::warn!("Ignoring saved game: {}", e);
            None
        }
    }
}

/// Forget the snapshot
pub fn clear<S: KeyValueStore>(store: &mut S) {
    match store.remove(SNAPSHOT_KEY) {
        Ok(()) => log::info!("Saved game cleared"),
        Err(e) => log::warn!("Failed to clear saved game: {}", e),
    }
}

/// Autosave runs throughout every wall-clock second divisible by the period
pub fn autosave_due(now_ms: i64) -> bool {
    (now_ms / 1000) % AUTOSAVE_PERIOD_SECS == 0
}
