//! Sky Runner - A side-scrolling platform runner
//!
//! Core modules:
//! - `sim`: Simulation (physics, collisions, level generation, camera)
//! - `input`: Keyboard/touch normalization into one logical input state
//! - `game`: Phase state machine and per-frame driver
//! - `persistence`: Snapshot save/restore over key-value storage
//! - `render`: Draw-from-state contract for the canvas
//! - `platform`: Browser/native platform abstraction

pub mod game;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;

pub use game::{Game, HudView, TransitionError};
pub use highscores::HighScore;
pub use input::{Action, InputSource};
pub use settings::Settings;

/// Game configuration constants
///
/// Velocities and accelerations are in world units per 60 Hz frame; the
/// simulation scales them by `dt * 60`.
pub mod consts {
    /// Downward acceleration per frame
    pub const GRAVITY: f32 = 0.6;
    /// Initial vertical velocity of a jump (negative is up)
    pub const JUMP_FORCE: f32 = -15.0;
    /// Second jump strength relative to `JUMP_FORCE`
    pub const DOUBLE_JUMP_FACTOR: f32 = 0.8;
    /// Horizontal speed while a direction is held
    pub const MOVE_SPEED: f32 = 6.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    pub const PLAYER_START_X: f32 = 100.0;

    pub const STARTING_LIVES: i32 = 3;

    /// Obstacle hit: upward kick relative to `JUMP_FORCE`, and push back
    pub const KNOCKBACK_FACTOR: f32 = 0.3;
    pub const KNOCKBACK_PUSH: f32 = 20.0;

    /// Player falls out of the world this far below the viewport
    pub const FALL_OUT_MARGIN: f32 = 100.0;

    /// Platforms per generated batch
    pub const LEVEL_BATCH_SIZE: usize = 5;
    pub const PLATFORM_GAP_MIN: f32 = 100.0;
    pub const PLATFORM_GAP_MAX: f32 = 200.0;
    pub const PLATFORM_WIDTH_MIN: f32 = 150.0;
    pub const PLATFORM_WIDTH_MAX: f32 = 350.0;
    pub const PLATFORM_THICKNESS: f32 = 20.0;
    /// Batch altitude is `viewport height - offset`, offset in [MIN, MAX)
    pub const PLATFORM_ALTITUDE_MIN: f32 = 100.0;
    pub const PLATFORM_ALTITUDE_MAX: f32 = 400.0;
    /// Gap between the last platform and the next batch
    pub const BATCH_LEAD_GAP: f32 = 150.0;

    pub const OBSTACLE_SIZE: f32 = 30.0;
    pub const OBSTACLE_CHANCE: f64 = 0.4;
    pub const OBSTACLE_DAMAGE: i32 = 1;

    /// Starting ground slab
    pub const GROUND_ID: &str = "ground";
    pub const GROUND_HEIGHT: f32 = 40.0;

    /// World must extend this far past the right edge of the screen
    pub const FRONTIER_MARGIN: f32 = 200.0;
    /// Entities this far behind the camera are evicted
    pub const EVICTION_MARGIN: f32 = 100.0;

    pub const DIFFICULTY_STEP: f32 = 0.05;

    /// Score is one point per this many units past the start
    pub const SCORE_UNIT: f32 = 10.0;

    /// First-frame timestep when there is no previous timestamp
    pub const FALLBACK_DT: f32 = 1.0 / 60.0;
    /// Largest timestep a single frame may integrate.
    ///
    /// A resting player sinks `GRAVITY * (dt * 60)^2` in one step, which
    /// must stay under `PLATFORM_THICKNESS` or the landing test misses.
    pub const MAX_FRAME_DT: f32 = 1.0 / 15.0;

    /// Snapshots older than this are ignored (24 * 66 hours)
    pub const SNAPSHOT_MAX_AGE_MS: i64 = 24 * 66 * 60 * 60 * 1000;
    /// Autosave runs during wall-clock seconds divisible by this
    pub const AUTOSAVE_PERIOD_SECS: i64 = 5;

    /// Default viewport before the first resize
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
}
