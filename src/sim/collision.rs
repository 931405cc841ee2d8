//! Collision tests for axis-aligned boxes
//!
//! Everything in the world is a rectangle with a top-left origin and y
//! growing downward, so "above" means a smaller y.

use glam::Vec2;

use super::state::{Player, Size};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Size,
}

impl Rect {
    pub fn new(pos: Vec2, size: Size) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.height
    }

    /// Strict overlap on both axes; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Horizontal extents overlap (strictly)
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }
}

/// Would the player come to rest on `platform` this frame?
///
/// The player must not have sunk below the platform's underside, must be
/// falling (or still), must be within the platform's span, and the bottom
/// edge projected one frame of velocity ahead must reach the top surface.
pub fn lands_on(player: &Player, platform: &Rect) -> bool {
    let body = player.rect();
    body.bottom() <= platform.bottom()
        && body.bottom() + player.velocity.y >= platform.top()
        && body.overlaps_x(platform)
        && player.velocity.y >= 0.0
}
