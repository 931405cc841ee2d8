//! Game state and core simulation types
//!
//! One `GameState` holds everything a run needs. The `Game` controller owns
//! it; `tick` and `handle_jump` are the only code that mutate it mid-run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::level::LevelGenerator;
use crate::consts::*;

/// Serialize a `Vec2` as `{ "x": .., "y": .. }` instead of glam's `[x, y]`
pub(crate) mod vec2_xy {
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xy {
        x: f32,
        y: f32,
    }

    pub fn serialize<S: Serializer>(v: &Vec2, s: S) -> Result<S::Ok, S::Error> {
        Xy { x: v.x, y: v.y }.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec2, D::Error> {
        let Xy { x, y } = Xy::deserialize(d)?;
        Ok(Vec2::new(x, y))
    }
}

/// Current phase of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no run in progress
    #[default]
    Menu,
    /// Active run (may be paused)
    Playing,
    /// Run ended
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    FellOut,
    OutOfLives,
}

/// Things that happened during a frame, for feedback (vibration, HUD pops)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Jumped,
    DoubleJumped,
    Landed,
    Hit { damage: i32, lives_left: i32 },
    LevelExtended { batch_start: f32 },
    RunEnded { reason: EndReason },
    NewHighScore { score: u64 },
}

/// Width/height of an axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Visible area in screen units; updated on window resize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

/// The runner
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Size,
    /// Units per 60 Hz frame
    pub velocity: Vec2,
    pub is_grounded: bool,
    pub can_double_jump: bool,
    /// Seconds remaining; anything <= 0 means vulnerable
    pub invincibility_time: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            id: "player".to_string(),
            pos,
            size: Size::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            velocity: Vec2::ZERO,
            is_grounded: false,
            can_double_jump: false,
            invincibility_time: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_time > 0.0
    }
}

/// Platform behavior. Only `Normal` is generated or simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Normal,
    Moving,
    Disappearing,
}

/// A solid ledge the player can land on from above
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    #[serde(with = "vec2_xy")]
    pub pos: Vec2,
    pub size: Size,
    #[serde(rename = "type", default)]
    pub kind: PlatformKind,
}

impl Platform {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// A hazard sitting on a platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: String,
    #[serde(with = "vec2_xy")]
    pub pos: Vec2,
    pub size: Size,
    pub damage: i32,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Complete state of the app and the current run
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    /// Only meaningful while `Playing`
    pub paused: bool,
    pub player: Player,
    /// Ordered by x; append-only apart from eviction
    pub platforms: Vec<Platform>,
    /// Ordered by x; append-only apart from eviction
    pub obstacles: Vec<Obstacle>,
    /// Leftmost visible world x; never decreases during a run
    pub camera_x: f32,
    /// Never decreases during a run
    pub score: u64,
    pub lives: i32,
    /// Grows with every generated batch. Not yet read by generation.
    pub difficulty_multiplier: f32,
    /// Best score across runs
    pub high_score: u64,
    /// Set when the last run beat `high_score`
    pub is_new_high_score: bool,
    /// Shown by the HUD; nothing in the simulation increments it yet
    pub combo: u32,
    pub viewport: Viewport,
    pub level: LevelGenerator,
    events: Vec<GameEvent>,
}

impl GameState {
    /// App state at launch: on the menu, with a fresh world laid out behind it
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        let mut state = Self {
            phase: GamePhase::Menu,
            paused: false,
            player: Player::new(Vec2::new(PLAYER_START_X, viewport.height / 2.0)),
            platforms: Vec::new(),
            obstacles: Vec::new(),
            camera_x: 0.0,
            score: 0,
            lives: STARTING_LIVES,
            difficulty_multiplier: 1.0,
            high_score: 0,
            is_new_high_score: false,
            combo: 0,
            viewport,
            level: LevelGenerator::new(seed),
            events: Vec::new(),
        };
        state.lay_out_world(0.0);
        state
    }

    /// Reset everything run-scoped to defaults. Keeps the high score, the
    /// viewport and the generator (so ids stay unique across runs).
    pub fn reset_run(&mut self) {
        self.paused = false;
        self.player = Player::new(Vec2::new(PLAYER_START_X, self.viewport.height / 2.0));
        self.camera_x = 0.0;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.difficulty_multiplier = 1.0;
        self.is_new_high_score = false;
        self.combo = 0;
        self.lay_out_world(0.0);
    }

    /// Replace the world with a ground slab starting at `origin_x` and one
    /// generated batch a screen width further on.
    pub fn lay_out_world(&mut self, origin_x: f32) {
        self.platforms.clear();
        self.obstacles.clear();
        self.platforms.push(Platform {
            id: GROUND_ID.to_string(),
            pos: Vec2::new(origin_x, self.viewport.height - GROUND_HEIGHT),
            size: Size::new(self.viewport.width * 2.0, GROUND_HEIGHT),
            kind: PlatformKind::Normal,
        });
        let start = origin_x + self.viewport.width;
        self.level.generate_level(
            start,
            self.viewport,
            &mut self.platforms,
            &mut self.obstacles,
        );
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Playing && !self.paused
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
