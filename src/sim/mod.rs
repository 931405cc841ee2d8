//! Simulation module
//!
//! All gameplay logic lives here:
//! - Variable timestep, scaled to 60 Hz frame units
//! - Seeded RNG only, owned by the level generator
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{Rect, lands_on};
pub use level::LevelGenerator;
pub use state::{
    EndReason, GameEvent, GamePhase, GameState, Obstacle, Platform, PlatformKind, Player, Size,
    Viewport,
};
pub use tick::{TickInput, end_run, handle_jump, tick};
