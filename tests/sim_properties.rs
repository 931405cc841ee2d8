//! Invariants that must hold for any input sequence and frame timing

use proptest::prelude::*;

use sky_runner::consts::*;
use sky_runner::persistence::MemoryStore;
use sky_runner::sim::{GameEvent, GamePhase, Viewport, camera};
use sky_runner::{Action, Game};

// Not an autosave second
const NOW: i64 = 1_700_000_001_000;

#[derive(Debug, Clone, Copy)]
struct Step {
    left: bool,
    right: bool,
    jump: bool,
    frame_ms: f64,
}

fn step() -> impl Strategy<Value = Step> {
    (any::<bool>(), prop::bool::weighted(0.8), prop::bool::weighted(0.1), 1.0..120.0f64).prop_map(
        |(left, right, jump, frame_ms)| Step {
            left,
            right,
            jump,
            frame_ms,
        },
    )
}

fn apply(game: &mut Game<MemoryStore>, step: &Step) {
    let input = game.input_mut();
    for (held, action) in [(step.left, Action::Left), (step.right, Action::Right)] {
        if held {
            input.press(action);
        } else {
            input.release(action);
        }
    }
    if step.jump {
        input.press(Action::Jump);
    } else {
        input.release(Action::Jump);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn run_invariants_hold(seed in any::<u64>(), steps in prop::collection::vec(step(), 1..400)) {
        let mut game = Game::new(seed, Viewport::default(), MemoryStore::new());
        game.start(NOW).unwrap();

        let mut time = 0.0;
        let mut camera_x = game.state().camera_x;
        let mut score = game.state().score;
        let mut lives = game.state().lives;

        for step in &steps {
            apply(&mut game, step);
            time += step.frame_ms;
            let events = game.frame(time, NOW);
            let state = game.state();

            prop_assert!(state.camera_x >= camera_x);
            prop_assert!(state.score >= score);
            prop_assert!(state.lives <= lives);
            prop_assert!(state.lives <= STARTING_LIVES);
            camera_x = state.camera_x;
            score = state.score;
            lives = state.lives;

            if state.phase == GamePhase::GameOver {
                let run_ended = events.iter().any(|e| matches!(e, GameEvent::RunEnded { .. }));
                prop_assert!(run_ended);
                break;
            }

            // A hit ends the frame before the world scrolls, and knockback may
            // leave the player behind the camera until the next frame
            if events.iter().any(|e| matches!(e, GameEvent::Hit { .. })) {
                continue;
            }

            prop_assert!(state.player.pos.x >= state.camera_x);
            let last = state.platforms.last().unwrap();
            prop_assert!(last.pos.x >= camera::frontier(state));
            for platform in &state.platforms {
                prop_assert!(platform.rect().right() > state.camera_x - EVICTION_MARGIN);
            }
            for obstacle in &state.obstacles {
                prop_assert!(obstacle.rect().right() > state.camera_x - EVICTION_MARGIN);
            }
        }
    }

    #[test]
    fn same_seed_same_world(seed in any::<u64>()) {
        let a = Game::new(seed, Viewport::default(), MemoryStore::new());
        let b = Game::new(seed, Viewport::default(), MemoryStore::new());
        prop_assert_eq!(&a.state().platforms, &b.state().platforms);
        prop_assert_eq!(&a.state().obstacles, &b.state().obstacles);
    }

    #[test]
    fn generated_platforms_stay_in_bounds(seed in any::<u64>()) {
        let game = Game::new(seed, Viewport::default(), MemoryStore::new());
        let viewport = game.state().viewport;
        for platform in game.state().platforms.iter().filter(|p| p.id != GROUND_ID) {
            prop_assert!(platform.size.width >= PLATFORM_WIDTH_MIN);
            prop_assert!(platform.size.width <= PLATFORM_WIDTH_MAX);
            prop_assert!(platform.pos.y <= viewport.height - PLATFORM_ALTITUDE_MIN);
            prop_assert!(platform.pos.y >= viewport.height - PLATFORM_ALTITUDE_MAX);
        }
    }
}
