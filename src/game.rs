//! Game controller
//!
//! Owns the run state, input and storage, and drives one simulation step
//! per animation frame. Menu/HUD code talks to the run only through the
//! phase requests here (`start`, `restart`, `go_to_menu`, `toggle_pause`).

use thiserror::Error;

use crate::consts::*;
use crate::highscores::HighScore;
use crate::input::InputSource;
use crate::persistence::{self, KeyValueStore};
use crate::render::FrameView;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, Viewport, handle_jump, tick};

/// A request from the UI to change phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRequest {
    Start,
    Restart,
    Menu,
    Pause,
}

/// The request is not valid in the current phase
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {request:?} from {from:?}")]
    Invalid {
        from: GamePhase,
        request: PhaseRequest,
    },
}

/// Everything the HUD and menus display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudView {
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    pub is_new_high_score: bool,
    pub lives: u32,
    pub combo: u32,
    pub is_paused: bool,
    /// Present when the FPS counter is enabled
    pub fps: Option<u32>,
}

impl HudView {
    /// Page overlays by element id, and whether each is shown
    pub fn overlays(&self) -> [(&'static str, bool); 5] {
        let playing = self.phase == GamePhase::Playing;
        [
            ("main-menu", self.phase == GamePhase::Menu),
            ("hud", playing),
            ("touch-controls", playing),
            ("pause-menu", playing && self.is_paused),
            ("game-over", self.phase == GamePhase::GameOver),
        ]
    }
}

/// One game session: the current run plus everything around it
pub struct Game<S: KeyValueStore> {
    state: GameState,
    input: InputSource,
    store: S,
    settings: Settings,
    high_score: HighScore,
    /// Timestamp (ms) of the previous frame callback
    last_frame_ms: Option<f64>,
    fps: f32,
}

impl<S: KeyValueStore> Game<S> {
    pub fn new(seed: u64, viewport: Viewport, store: S) -> Self {
        let high_score = HighScore::load(&store);
        let settings = Settings::load(&store);
        let mut state = GameState::new(seed, viewport);
        state.high_score = high_score.best;
        log::info!("Game initialized with seed: {}", seed);

        Self {
            state,
            input: InputSource::new(),
            store,
            settings,
            high_score,
            last_frame_ms: None,
            fps: 0.0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Shared input state for keyboard handlers and touch controls
    pub fn input_mut(&mut self) -> &mut InputSource {
        &mut self.input
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Err(e) = settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// MENU -> PLAYING. Resumes a recent saved run if there is one.
    ///
    /// Returns whether a saved run was restored.
    pub fn start(&mut self, now_ms: i64) -> Result<bool, TransitionError> {
        self.require(GamePhase::Menu, PhaseRequest::Start)?;
        self.begin_run();

        let restored = match persistence::load(&self.store, now_ms) {
            Some(snapshot) => {
                snapshot.restore_into(&mut self.state);
                log::info!(
                    "Resumed saved run (score {}, lives {})",
                    self.state.score,
                    self.state.lives
                );
                true
            }
            None => false,
        };
        self.state.phase = GamePhase::Playing;
        Ok(restored)
    }

    /// GAME_OVER -> PLAYING with a fresh run; the saved run is discarded
    pub fn restart(&mut self) -> Result<(), TransitionError> {
        self.require(GamePhase::GameOver, PhaseRequest::Restart)?;
        persistence::clear(&mut self.store);
        self.begin_run();
        self.state.phase = GamePhase::Playing;
        log::info!("Game restarted");
        Ok(())
    }

    /// GAME_OVER -> MENU
    pub fn go_to_menu(&mut self) -> Result<(), TransitionError> {
        self.require(GamePhase::GameOver, PhaseRequest::Menu)?;
        self.state.phase = GamePhase::Menu;
        self.state.paused = false;
        Ok(())
    }

    /// Pause or resume the run. Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> Result<bool, TransitionError> {
        self.require(GamePhase::Playing, PhaseRequest::Pause)?;
        self.state.paused = !self.state.paused;
        log::info!("{}", if self.state.paused { "Paused" } else { "Resumed" });
        Ok(self.state.paused)
    }

    /// Jump right now (touch button). Ignored outside an unpaused run.
    pub fn jump(&mut self) -> bool {
        handle_jump(&mut self.state)
    }

    /// Window resized; takes effect from the next frame
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.viewport = Viewport { width, height };
    }

    /// Run one animation frame.
    ///
    /// `timestamp_ms` is the frame callback's monotonic timestamp, `now_ms`
    /// the wall clock used for autosave and snapshot age.
    pub fn frame(&mut self, timestamp_ms: f64, now_ms: i64) -> Vec<GameEvent> {
        let dt = match self.last_frame_ms {
            Some(prev) => (((timestamp_ms - prev) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => FALLBACK_DT,
        };
        self.last_frame_ms = Some(timestamp_ms);
        if dt > 0.0 {
            self.fps = 1.0 / dt;
        }

        let input = self.input.take_frame_input();
        if input.pause {
            if let Err(e) = self.toggle_pause() {
                log::debug!("Ignoring pause key: {}", e);
            }
        }
        if input.jump {
            handle_jump(&mut self.state);
        }

        tick(&mut self.state, &input.held, dt);

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::NewHighScore { score } = *event {
                self.record_high_score(score);
            }
        }

        if self.state.is_running() && persistence::autosave_due(now_ms) {
            self.save(now_ms);
        }

        events
    }

    /// Snapshot the run now
    pub fn save(&mut self, now_ms: i64) {
        if let Err(e) = persistence::save(&mut self.store, &self.state, now_ms) {
            log::warn!("Autosave failed: {}", e);
        }
    }

    pub fn hud(&self) -> HudView {
        HudView {
            phase: self.state.phase,
            score: self.state.score,
            high_score: self.state.high_score,
            is_new_high_score: self.state.is_new_high_score,
            lives: self.state.lives.max(0) as u32,
            combo: self.state.combo,
            is_paused: self.state.paused,
            fps: self.settings.show_fps.then(|| self.fps.round() as u32),
        }
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView::from_state(&self.state)
    }

    fn begin_run(&mut self) {
        self.state.reset_run();
        self.input.clear();
        self.last_frame_ms = None;
    }

    fn record_high_score(&mut self, score: u64) {
        if self.high_score.submit(score) {
            if let Err(e) = self.high_score.save(&mut self.store) {
                log::warn!("Failed to save high score: {}", e);
            }
        }
    }

    fn require(&self, phase: GamePhase, request: PhaseRequest) -> Result<(), TransitionError> {
        if self.state.phase == phase {
            Ok(())
        } else {
            Err(TransitionError::Invalid {
                from: self.state.phase,
                request,
            })
        }
    }
}
