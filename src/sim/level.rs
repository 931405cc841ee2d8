//! Procedural level generation
//!
//! Extends the world to the right in batches of platforms. A batch shares
//! one altitude, so the player gets a short runway at a fixed height before
//! the next batch changes it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Obstacle, Platform, PlatformKind, Size, Viewport};
use crate::consts::*;

/// Seeded platform/obstacle factory with its own id counter
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    rng: Pcg32,
    next_id: u64,
}

impl LevelGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity id
    fn next_entity_id(&mut self, prefix: &str) -> String {
        let id = self.next_id;
        self.next_id += 1;
        format!("{prefix}-{id}")
    }

    /// Make sure ids handed out later never collide with `id`.
    ///
    /// Used after restoring entities from a snapshot.
    pub fn reserve_id(&mut self, id: &str) {
        let Some((_, number)) = id.rsplit_once('-') else {
            return;
        };
        if let Ok(n) = number.parse::<u64>() {
            self.next_id = self.next_id.max(n.saturating_add(1));
        }
    }

    /// Append one batch of platforms (and maybe obstacles) starting at `start_x`
    pub fn generate_level(
        &mut self,
        start_x: f32,
        viewport: Viewport,
        platforms: &mut Vec<Platform>,
        obstacles: &mut Vec<Obstacle>,
    ) {
        let altitude = viewport.height
            - self
                .rng
                .random_range(PLATFORM_ALTITUDE_MIN..PLATFORM_ALTITUDE_MAX);
        let mut x = start_x;

        for _ in 0..LEVEL_BATCH_SIZE {
            let gap = self.rng.random_range(PLATFORM_GAP_MIN..PLATFORM_GAP_MAX);
            let width = self
                .rng
                .random_range(PLATFORM_WIDTH_MIN..PLATFORM_WIDTH_MAX);

            platforms.push(Platform {
                id: self.next_entity_id("plat"),
                pos: Vec2::new(x, altitude),
                size: Size::new(width, PLATFORM_THICKNESS),
                kind: PlatformKind::Normal,
            });

            if self.rng.random_bool(OBSTACLE_CHANCE) {
                obstacles.push(Obstacle {
                    id: self.next_entity_id("obs"),
                    pos: Vec2::new(
                        x + width / 2.0 - OBSTACLE_SIZE / 2.0,
                        altitude - OBSTACLE_SIZE,
                    ),
                    size: Size::new(OBSTACLE_SIZE, OBSTACLE_SIZE),
                    damage: OBSTACLE_DAMAGE,
                });
            }

            x += width + gap;
        }

        log::debug!(
            "Generated batch at x={:.0}..{:.0}, altitude {:.0}",
            start_x,
            x,
            altitude
        );
    }
}
