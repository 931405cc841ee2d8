//! Sky Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, TouchEvent};

    use sky_runner::persistence::{KeyValueStore, MemoryStore};
    use sky_runner::platform::{self, LocalStore};
    use sky_runner::render::{self, Color, Surface};
    use sky_runner::sim::{GameEvent, GamePhase, Viewport};
    use sky_runner::{Action, Game, HudView};

    const JUMP_VIBRATION_MS: u32 = 10;
    const HIT_VIBRATION_MS: u32 = 50;

    /// Canvas 2D context as a render surface
    struct CanvasSurface {
        ctx: CanvasRenderingContext2d,
    }

    impl Surface for CanvasSurface {
        fn clear(&mut self, color: Color, width: f32, height: f32) {
            self.ctx.set_global_alpha(1.0);
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
        }

        fn set_alpha(&mut self, alpha: f32) {
            self.ctx.set_global_alpha(alpha as f64);
        }

        fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(x as f64, y as f64, width as f64, height as f64);
        }

        fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.begin_path();
            self.ctx.move_to(a.x as f64, a.y as f64);
            self.ctx.line_to(b.x as f64, b.y as f64);
            self.ctx.line_to(c.x as f64, c.y as f64);
            self.ctx.close_path();
            self.ctx.fill();
        }
    }

    /// Browser-side state around the game
    struct App {
        game: Game<Box<dyn KeyValueStore>>,
        surface: CanvasSurface,
        canvas: HtmlCanvasElement,
        document: Document,
        last_phase: Option<GamePhase>,
    }

    type SharedApp = Rc<RefCell<App>>;

    impl App {
        fn frame(&mut self, time: f64) {
            let events = self.game.frame(time, platform::now_ms());
            self.feedback(&events);

            render::render(&self.game.view(), &mut self.surface);
            self.update_hud();
        }

        /// Haptics for jumps and hits
        fn feedback(&self, events: &[GameEvent]) {
            if !self.game.settings().vibration_enabled {
                return;
            }
            for event in events {
                match event {
                    GameEvent::Jumped | GameEvent::DoubleJumped => platform::vibrate(JUMP_VIBRATION_MS),
                    GameEvent::Hit { .. } => platform::vibrate(HIT_VIBRATION_MS),
                    _ => {}
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let hud = self.game.hud();
            let document = &self.document;

            set_text(document, "hud-score", &hud.score.to_string());
            set_text(document, "hud-high-score", &hud.high_score.to_string());
            set_text(document, "hud-lives", &"♥".repeat(hud.lives as usize));

            if let Some(fps) = hud.fps {
                set_text(document, "hud-fps", &format!("{} FPS", fps));
            }
            show(document, "hud-fps", hud.fps.is_some());

            for (id, visible) in hud.overlays() {
                show(document, id, visible);
            }

            // Final scores are filled in once per phase change
            if self.last_phase == Some(hud.phase) {
                return;
            }
            self.last_phase = Some(hud.phase);

            match hud.phase {
                GamePhase::Menu => {
                    set_text(document, "menu-high-score", &hud.high_score.to_string());
                }
                GamePhase::GameOver => update_game_over(document, &hud),
                GamePhase::Playing => {}
            }
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
            self.game.resize(width as f32, height as f32);
        }
    }

    fn update_game_over(document: &Document, hud: &HudView) {
        set_text(document, "final-score", &hud.score.to_string());
        set_text(document, "final-high-score", &hud.high_score.to_string());
        show(document, "new-high-score", hud.is_new_high_score);
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Toggle the `hidden` class, keeping whatever else the page styled
    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            if let Err(e) = el.class_list().toggle_with_force("hidden", !visible) {
                log::warn!("Failed to toggle #{}: {:?}", id, e);
            }
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{}, progress will not be kept", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&e.to_string().into());
        }

        log::info!("Sky Runner starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        show(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(seed, Viewport::default(), open_store());

        let app = Rc::new(RefCell::new(App {
            game,
            surface: CanvasSurface { ctx },
            canvas,
            document,
            last_phase: None,
        }));
        app.borrow_mut().resize();

        setup_keyboard(app.clone());
        setup_touch_controls(app.clone());
        setup_menu_buttons(app.clone());
        setup_resize(app.clone());
        setup_auto_pause(app.clone());

        // Start game loop
        request_animation_frame(app);

        log::info!("Sky Runner running!");
        Ok(())
    }

    fn setup_keyboard(app: SharedApp) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut a = app.borrow_mut();
                if Action::from_key_code(&event.code()).is_some() {
                    event.prevent_default();
                }
                a.game.input_mut().key_down(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                app.borrow_mut().game.input_mut().key_up(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Hold-to-move buttons and a tap-to-jump button
    fn setup_touch_controls(app: SharedApp) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for (id, action) in [("left-btn", Action::Left), ("right-btn", Action::Right)] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };

            for down in ["touchstart", "mousedown"] {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                    event.prevent_default();
                    app.borrow_mut().game.input_mut().press(action);
                });
                let _ = btn.add_event_listener_with_callback(down, closure.as_ref().unchecked_ref());
                closure.forget();
            }

            for up in ["touchend", "touchcancel", "mouseup", "mouseleave"] {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                    event.prevent_default();
                    app.borrow_mut().game.input_mut().release(action);
                });
                let _ = btn.add_event_listener_with_callback(up, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("jump-btn") {
            {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    app.borrow_mut().game.jump();
                });
                let _ = btn
                    .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    app.borrow_mut().game.jump();
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn on_click<F>(document: &Document, id: &str, app: &SharedApp, handler: F)
    where
        F: Fn(&mut App) + 'static,
    {
        let Some(btn) = document.get_element_by_id(id) else {
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            handler(&mut app.borrow_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu_buttons(app: SharedApp) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        on_click(&document, "start-btn", &app, |a| {
            match a.game.start(platform::now_ms()) {
                Ok(true) => log::info!("Continuing saved run"),
                Ok(false) => log::info!("New run started"),
                Err(e) => log::warn!("{}", e),
            }
        });
        on_click(&document, "restart-btn", &app, |a| {
            if let Err(e) = a.game.restart() {
                log::warn!("{}", e);
            }
        });
        on_click(&document, "menu-btn", &app, |a| {
            if let Err(e) = a.game.go_to_menu() {
                log::warn!("{}", e);
            }
        });
        for id in ["pause-btn", "resume-btn"] {
            on_click(&document, id, &app, |a| {
                if let Err(e) = a.game.toggle_pause() {
                    log::warn!("{}", e);
                }
            });
        }
    }

    fn setup_resize(app: SharedApp) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn auto_pause(app: &SharedApp, why: &str) {
        let mut a = app.borrow_mut();
        if !a.game.state().is_running() {
            return;
        }
        match a.game.toggle_pause() {
            Ok(_) => {
                a.game.input_mut().clear();
                log::info!("Auto-paused ({})", why);
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    fn setup_auto_pause(app: SharedApp) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    auto_pause(&app, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                auto_pause(&app, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: SharedApp) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: SharedApp, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sky Runner (native) starting...");
    log::info!("Native mode is headless - build for wasm32 and serve for the playable version");

    autopilot::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run driven by a simple bot, useful for eyeballing level
/// generation and scoring from the terminal.
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use sky_runner::consts::*;
    use sky_runner::persistence::MemoryStore;
    use sky_runner::sim::{EndReason, GameEvent, GameState, Viewport};
    use sky_runner::{Action, Game};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 120;
    /// Look this far ahead of the player for gaps and spikes
    const LOOKAHEAD: f32 = 60.0;

    pub fn run() {
        let seed = std::env::args()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| sky_runner::platform::now_ms() as u64);

        let mut game = Game::new(seed, Viewport::default(), MemoryStore::new());
        if let Err(e) = game.start(sky_runner::platform::now_ms()) {
            log::error!("{}", e);
            return;
        }
        game.input_mut().press(Action::Right);

        let mut jumps = 0u32;
        let mut hits = 0u32;
        let mut end = None;
        let mut frames = 0u32;

        while frames < MAX_FRAMES {
            if should_jump(game.state()) {
                game.jump();
            }
            let now = sky_runner::platform::now_ms();
            for event in game.frame(frames as f64 * FRAME_MS, now) {
                match event {
                    GameEvent::Jumped | GameEvent::DoubleJumped => jumps += 1,
                    GameEvent::Hit { lives_left, .. } => {
                        hits += 1;
                        log::info!("Hit! {} lives left", lives_left);
                    }
                    GameEvent::LevelExtended { batch_start } => {
                        log::debug!("Level extended at x={:.0}", batch_start);
                    }
                    GameEvent::RunEnded { reason } => end = Some(reason),
                    GameEvent::NewHighScore { score } => log::info!("New high score: {}", score),
                    GameEvent::Landed => {}
                }
            }
            frames += 1;
            if end.is_some() {
                break;
            }
            if frames % 600 == 0 {
                log::info!("t={}s score={}", frames / 60, game.state().score);
            }
        }

        let state = game.state();
        let outcome = match end {
            Some(EndReason::FellOut) => "fell out",
            Some(EndReason::OutOfLives) => "out of lives",
            None => "time up",
        };
        println!("Seed:       {}", seed);
        println!("Outcome:    {} after {:.1}s", outcome, frames as f64 / 60.0);
        println!("Score:      {}", state.score);
        println!("Distance:   {:.0}", state.player.pos.x - PLAYER_START_X);
        println!("Jumps:      {}", jumps);
        println!("Hits:       {}", hits);
        println!("Lives left: {}", state.lives.max(0));
    }

    /// Jump when grounded and the floor ends or a spike is just ahead
    fn should_jump(state: &GameState) -> bool {
        let player = &state.player;
        if !player.is_grounded {
            return false;
        }
        let feet = player.pos.y + player.size.height;
        let probe = player.pos.x + player.size.width + LOOKAHEAD;

        let floor_ahead = state.platforms.iter().any(|p| {
            let r = p.rect();
            (r.top() - feet).abs() < 1.0 && r.left() <= probe && r.right() >= probe
        });
        let spike_ahead = state.obstacles.iter().any(|o| {
            let r = o.rect();
            r.left() > player.pos.x && r.left() <= probe && (r.bottom() - feet).abs() < 1.0
        });
        !floor_ahead || spike_ahead
    }
}
