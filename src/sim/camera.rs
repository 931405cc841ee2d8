//! Scrolling camera, world frontier and eviction
//!
//! The camera only ever moves right. Everything left of it (minus a small
//! margin) is dropped, and the world is extended before its right end
//! comes into view.

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Move the camera toward keeping the player a third of the way across
/// the screen. Never moves backward.
pub fn follow_player(state: &mut GameState) {
    let target = state.player.pos.x - state.viewport.width / 3.0;
    if target > state.camera_x {
        state.camera_x = target;
    }
}

/// World x that the last platform must reach
pub fn frontier(state: &GameState) -> f32 {
    state.camera_x + state.viewport.width + FRONTIER_MARGIN
}

/// Append batches until the last platform starts past the frontier.
///
/// Returns how many batches were generated.
pub fn extend_world(state: &mut GameState) -> usize {
    let mut batches = 0;
    loop {
        let limit = frontier(state);
        let start = match state.platforms.last() {
            Some(last) if last.pos.x >= limit => break,
            Some(last) => last.rect().right() + BATCH_LEAD_GAP,
            None => state.camera_x,
        };

        let viewport = state.viewport;
        state
            .level
            .generate_level(start, viewport, &mut state.platforms, &mut state.obstacles);
        state.difficulty_multiplier += DIFFICULTY_STEP;
        state.push_event(GameEvent::LevelExtended { batch_start: start });
        batches += 1;
    }
    batches
}

/// Drop platforms and obstacles whose right edge is too far behind the camera
pub fn evict_behind(state: &mut GameState) {
    let cutoff = state.camera_x - EVICTION_MARGIN;
    state.platforms.retain(|p| p.rect().right() > cutoff);
    state.obstacles.retain(|o| o.rect().right() > cutoff);
}

/// Convert a world x to a screen x
#[inline]
pub fn world_to_screen_x(camera_x: f32, x: f32) -> f32 {
    x - camera_x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Platform, PlatformKind, Size, Viewport};
    use glam::Vec2;

    fn state() -> GameState {
        GameState::new(11, Viewport::default())
    }

    #[test]
    fn test_camera_follows_forward_only() {
        let mut state = state();
        state.player.pos.x = 1000.0;
        follow_player(&mut state);
        let expected = 1000.0 - DEFAULT_VIEWPORT_WIDTH / 3.0;
        assert_eq!(state.camera_x, expected);

        state.player.pos.x = 200.0;
        follow_player(&mut state);
        assert_eq!(state.camera_x, expected);
    }

    #[test]
    fn test_extend_world_reaches_frontier() {
        let mut state = state();
        state.camera_x = 20_000.0;
        let batches = extend_world(&mut state);
        assert!(batches >= 1);
        let last = state.platforms.last().unwrap();
        assert!(last.pos.x >= frontier(&state));
        assert!((state.difficulty_multiplier - (1.0 + DIFFICULTY_STEP * batches as f32)).abs() < 1e-4);
    }

    #[test]
    fn test_extend_world_noop_when_far_enough() {
        let mut state = state();
        state.platforms.push(Platform {
            id: "far".into(),
            pos: Vec2::new(1_000_000.0, 400.0),
            size: Size::new(200.0, 20.0),
            kind: PlatformKind::Normal,
        });
        let before = state.platforms.len();
        assert_eq!(extend_world(&mut state), 0);
        assert_eq!(state.platforms.len(), before);
        assert_eq!(state.difficulty_multiplier, 1.0);
    }

    #[test]
    fn test_extend_world_from_empty() {
        let mut state = state();
        state.platforms.clear();
        state.camera_x = 300.0;
        extend_world(&mut state);
        assert_eq!(state.platforms[0].pos.x, 300.0);
        assert!(state.platforms.last().unwrap().pos.x >= frontier(&state));
    }

    #[test]
    fn test_evict_behind() {
        let mut state = state();
        state.camera_x = 10_000.0;
        extend_world(&mut state);
        evict_behind(&mut state);
        let cutoff = state.camera_x - EVICTION_MARGIN;
        assert!(state.platforms.iter().all(|p| p.rect().right() >= cutoff));
        assert!(state.obstacles.iter().all(|o| o.rect().right() >= cutoff));
        assert!(!state.platforms.iter().any(|p| p.id == GROUND_ID));
    }
}
