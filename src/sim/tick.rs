//! Per-frame simulation step
//!
//! Advances the run by a variable `dt` (seconds). Velocities are stored in
//! units per 60 Hz frame and integrated as `v * dt * 60`, so the game plays
//! at the same speed regardless of display refresh rate.

use super::camera;
use super::collision::lands_on;
use super::state::{EndReason, GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Held inputs for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

/// Advance the run by `dt` seconds. No-op unless playing and unpaused.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !state.is_running() {
        return;
    }

    let frame_scale = dt * 60.0;
    let was_grounded = state.player.is_grounded;
    let camera_x = state.camera_x;
    let player = &mut state.player;

    if player.invincibility_time > 0.0 {
        player.invincibility_time -= dt;
    }

    // Left is checked first, so holding both directions moves left
    player.velocity.x = if input.left {
        -MOVE_SPEED
    } else if input.right {
        MOVE_SPEED
    } else {
        0.0
    };
    player.pos.x += player.velocity.x * frame_scale;

    // No backtracking off the left edge of the screen
    if player.pos.x < camera_x {
        player.pos.x = camera_x;
    }

    player.velocity.y += GRAVITY * frame_scale;
    player.pos.y += player.velocity.y * frame_scale;
    player.is_grounded = false;

    if player.pos.y > state.viewport.height + FALL_OUT_MARGIN {
        end_run(state, EndReason::FellOut);
        return;
    }

    resolve_landings(state);
    if state.player.is_grounded && !was_grounded {
        state.push_event(GameEvent::Landed);
    }

    if resolve_obstacle_hit(state) {
        return;
    }

    camera::follow_player(state);
    update_score(state);
    camera::extend_world(state);
    camera::evict_behind(state);
}

/// Snap the player onto every platform it lands on this frame.
///
/// Platforms are never generated overlapping, so at most one applies in
/// practice; if several do, the last one wins.
fn resolve_landings(state: &mut GameState) {
    let player = &mut state.player;
    for platform in &state.platforms {
        let surface = platform.rect();
        if lands_on(player, &surface) {
            player.is_grounded = true;
            player.velocity.y = 0.0;
            player.pos.y = surface.top() - player.size.height;
            player.can_double_jump = true;
        }
    }
}

/// Apply at most one obstacle hit. Returns true if one was processed, in
/// which case the rest of the frame is skipped.
///
/// A hit does not start an invincibility window, so a player still
/// touching the obstacle next frame is hit again.
fn resolve_obstacle_hit(state: &mut GameState) -> bool {
    if state.player.is_invincible() {
        return false;
    }
    let body = state.player.rect();
    let Some(damage) = state
        .obstacles
        .iter()
        .find(|o| body.overlaps(&o.rect()))
        .map(|o| o.damage)
    else {
        return false;
    };

    state.lives -= damage;
    state.push_event(GameEvent::Hit {
        damage,
        lives_left: state.lives,
    });
    log::debug!("Obstacle hit for {}, {} lives left", damage, state.lives);

    if state.lives <= 0 {
        end_run(state, EndReason::OutOfLives);
    } else {
        state.player.velocity.y = JUMP_FORCE * KNOCKBACK_FACTOR;
        state.player.pos.x -= KNOCKBACK_PUSH;
    }
    true
}

/// Score is the distance travelled from the start line, in tens of units
fn update_score(state: &mut GameState) {
    let distance = ((state.player.pos.x - PLAYER_START_X) / SCORE_UNIT).floor();
    if distance > state.score as f32 {
        state.score = distance as u64;
    }
}

/// Jump from the ground, or spend the double jump while airborne.
///
/// Returns true if a jump happened. Ignored unless playing and unpaused.
pub fn handle_jump(state: &mut GameState) -> bool {
    if !state.is_running() {
        return false;
    }
    let player = &mut state.player;
    if player.is_grounded {
        player.velocity.y = JUMP_FORCE;
        player.is_grounded = false;
        state.push_event(GameEvent::Jumped);
        true
    } else if player.can_double_jump {
        player.velocity.y = JUMP_FORCE * DOUBLE_JUMP_FACTOR;
        player.can_double_jump = false;
        state.push_event(GameEvent::DoubleJumped);
        true
    } else {
        false
    }
}

/// Finish the run and record a new high score. Only acts once per run.
pub fn end_run(state: &mut GameState, reason: EndReason) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.paused = false;
    state.push_event(GameEvent::RunEnded { reason });
    log::info!("Run ended ({:?}) with score {}", reason, state.score);

    if state.score > state.high_score {
        state.high_score = state.score;
        state.is_new_high_score = true;
        state.push_event(GameEvent::NewHighScore { score: state.score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Obstacle, Platform, PlatformKind, Size, Viewport};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn playing() -> GameState {
        let mut state = GameState::new(12345, Viewport::default());
        state.phase = GamePhase::Playing;
        state
    }

    /// Put a platform directly under the player so it lands next frame
    fn stand_on_platform(state: &mut GameState) -> Platform {
        let platform = Platform {
            id: "under".into(),
            pos: Vec2::new(state.player.pos.x - 50.0, state.player.pos.y + PLAYER_HEIGHT + 0.5),
            size: Size::new(300.0, PLATFORM_THICKNESS),
            kind: PlatformKind::Normal,
        };
        state.platforms.insert(1, platform.clone());
        platform
    }

    #[test]
    fn test_tick_noop_outside_playing() {
        let mut state = GameState::new(1, Viewport::default());
        let before = state.player.clone();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player, before);

        state.phase = GamePhase::Playing;
        state.paused = true;
        tick(&mut state, &TickInput { right: true, ..Default::default() }, DT);
        assert_eq!(state.player, before);
    }

    #[test]
    fn test_horizontal_input() {
        let mut state = playing();
        let x = state.player.pos.x;
        tick(&mut state, &TickInput { right: true, left: false }, DT);
        assert!((state.player.pos.x - (x + MOVE_SPEED)).abs() < 1e-4);

        let x = state.player.pos.x;
        tick(&mut state, &TickInput { right: true, left: true }, DT);
        assert!((state.player.pos.x - (x - MOVE_SPEED)).abs() < 1e-4);
        assert_eq!(state.player.velocity.x, -MOVE_SPEED);
    }

    #[test]
    fn test_cannot_walk_left_of_camera() {
        let mut state = playing();
        state.camera_x = 95.0;
        tick(&mut state, &TickInput { left: true, right: false }, DT);
        assert_eq!(state.player.pos.x, 95.0);
    }

    #[test]
    fn test_landing_snaps_to_surface() {
        let mut state = playing();
        let platform = stand_on_platform(&mut state);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player.pos.y, platform.pos.y - PLAYER_HEIGHT);
        assert_eq!(state.player.velocity.y, 0.0);
        assert!(state.player.is_grounded);
        assert!(state.player.can_double_jump);
        assert!(state.drain_events().contains(&GameEvent::Landed));
    }

    #[test]
    fn test_longest_frame_keeps_player_on_platform() {
        let mut state = playing();
        let platform = stand_on_platform(&mut state);
        assert_eq!(platform.size.height, PLATFORM_THICKNESS);
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.player.is_grounded);

        for _ in 0..3 {
            tick(&mut state, &TickInput::default(), MAX_FRAME_DT);
            assert!(state.player.is_grounded);
            assert_eq!(state.player.pos.y, platform.pos.y - PLAYER_HEIGHT);
            assert_eq!(state.phase, GamePhase::Playing);
        }
    }

    #[test]
    fn test_jump_then_double_jump_then_nothing() {
        let mut state = playing();
        stand_on_platform(&mut state);
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.player.is_grounded);

        assert!(handle_jump(&mut state));
        assert_eq!(state.player.velocity.y, JUMP_FORCE);
        assert!(!state.player.is_grounded);

        assert!(handle_jump(&mut state));
        assert_eq!(state.player.velocity.y, JUMP_FORCE * DOUBLE_JUMP_FACTOR);
        assert!(!state.player.can_double_jump);

        assert!(!handle_jump(&mut state));
        assert_eq!(state.player.velocity.y, JUMP_FORCE * DOUBLE_JUMP_FACTOR);
    }

    #[test]
    fn test_jump_ignored_when_paused_or_not_playing() {
        let mut state = playing();
        state.player.is_grounded = true;
        state.paused = true;
        assert!(!handle_jump(&mut state));
        state.paused = false;
        state.phase = GamePhase::GameOver;
        assert!(!handle_jump(&mut state));
        assert!(state.player.is_grounded);
    }

    #[test]
    fn test_falling_out_of_world_ends_run() {
        let mut state = playing();
        state.player.pos = Vec2::new(100.0, 300.0);
        state.viewport = Viewport { width: 800.0, height: 600.0 };
        // Nothing below, and the frontier is already satisfied
        state.platforms = vec![Platform {
            id: "far".into(),
            pos: Vec2::new(1_000_000.0, 500.0),
            size: Size::new(200.0, 20.0),
            kind: PlatformKind::Normal,
        }];
        state.obstacles.clear();
        state.score = 5;
        state.high_score = 3;

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.player.pos.y > 600.0 + FALL_OUT_MARGIN);
        assert_eq!(state.high_score, 5);
        assert!(state.is_new_high_score);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::RunEnded { reason: EndReason::FellOut }));
    }

    #[test]
    fn test_last_life_lost_on_obstacle() {
        let mut state = playing();
        state.lives = 1;
        state.score = 12;
        state.high_score = 4;
        state.obstacles.push(Obstacle {
            id: "spike".into(),
            pos: state.player.pos,
            size: Size::new(OBSTACLE_SIZE, OBSTACLE_SIZE),
            damage: 1,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.high_score, 12);
        assert!(state.drain_events().contains(&GameEvent::NewHighScore { score: 12 }));
    }

    #[test]
    fn test_hit_knocks_back_without_invincibility() {
        let mut state = playing();
        let x = state.player.pos.x;
        state.obstacles.push(Obstacle {
            id: "spike".into(),
            pos: state.player.pos,
            size: Size::new(OBSTACLE_SIZE, OBSTACLE_SIZE),
            damage: 1,
        });
        let camera_before = state.camera_x;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.velocity.y, JUMP_FORCE * KNOCKBACK_FACTOR);
        assert!((state.player.pos.x - (x - KNOCKBACK_PUSH)).abs() < 1e-4);
        assert_eq!(state.player.invincibility_time, 0.0);
        // Rest of the frame skipped
        assert_eq!(state.camera_x, camera_before);
    }

    #[test]
    fn test_invincible_player_ignores_obstacles() {
        let mut state = playing();
        state.player.invincibility_time = 1.0;
        state.obstacles.push(Obstacle {
            id: "spike".into(),
            pos: state.player.pos,
            size: Size::new(OBSTACLE_SIZE, OBSTACLE_SIZE),
            damage: 1,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.lives, STARTING_LIVES);
        assert!((state.player.invincibility_time - (1.0 - DT)).abs() < 1e-6);
    }

    #[test]
    fn test_score_from_distance() {
        let mut state = playing();
        state.player.pos.x = 355.0;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, 25);

        // Moving back never lowers the score
        state.player.pos.x = 300.0;
        state.camera_x = 0.0;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, 25);
    }

    #[test]
    fn test_end_run_only_once() {
        let mut state = playing();
        end_run(&mut state, EndReason::OutOfLives);
        end_run(&mut state, EndReason::FellOut);
        let ended = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }
}
