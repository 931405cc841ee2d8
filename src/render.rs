//! Draw-from-state contract
//!
//! The renderer only ever sees a `FrameView` borrowed from the simulation,
//! and paints primitives through the `Surface` trait. The web build
//! implements `Surface` over a Canvas 2D context.

use glam::Vec2;

use crate::sim::camera::world_to_screen_x;
use crate::sim::{GameState, Obstacle, Platform, Player, Rect, Viewport};

/// 0xRRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub fn to_css(self) -> String {
        format!("#{:06x}", self.0 & 0xff_ffff)
    }
}

/// Palette
pub mod palette {
    use super::Color;

    pub const SKY: Color = Color(0x0f172a);
    pub const STAR: Color = Color(0xffffff);
    pub const SHADOW: Color = Color(0x000000);
    pub const PLATFORM: Color = Color(0x475569);
    pub const PLATFORM_EDGE: Color = Color(0x94a3b8);
    pub const OBSTACLE: Color = Color(0xef4444);
    pub const OBSTACLE_SHINE: Color = Color(0xfca5a5);
    pub const PLAYER: Color = Color(0x3b82f6);
    pub const EYE: Color = Color(0xffffff);
    pub const PUPIL: Color = Color(0x1e293b);
}

/// Something that can paint filled primitives in screen coordinates
pub trait Surface {
    fn clear(&mut self, color: Color, width: f32, height: f32);
    fn set_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);
    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color);
}

/// Read-only slice of the simulation needed to paint one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub player: &'a Player,
    pub platforms: &'a [Platform],
    pub obstacles: &'a [Obstacle],
    pub camera_x: f32,
    pub viewport: Viewport,
}

impl<'a> FrameView<'a> {
    pub fn from_state(state: &'a GameState) -> Self {
        Self {
            player: &state.player,
            platforms: &state.platforms,
            obstacles: &state.obstacles,
            camera_x: state.camera_x,
            viewport: state.viewport,
        }
    }

    /// Does any part of `rect` fall inside the screen horizontally?
    pub fn is_visible(&self, rect: &Rect) -> bool {
        rect.right() >= self.camera_x && rect.left() <= self.camera_x + self.viewport.width
    }

    /// World position to screen position
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(world_to_screen_x(self.camera_x, world.x), world.y)
    }
}

const STAR_COUNT: u32 = 50;
const STAR_PARALLAX: f32 = 0.1;

/// Paint a whole frame
pub fn render<S: Surface + ?Sized>(view: &FrameView, surface: &mut S) {
    let Viewport { width, height } = view.viewport;
    surface.clear(palette::SKY, width, height);
    draw_stars(view, surface);

    for platform in view.platforms {
        let rect = platform.rect();
        if view.is_visible(&rect) {
            draw_platform(view, &rect, surface);
        }
    }

    for obstacle in view.obstacles {
        let rect = obstacle.rect();
        if view.is_visible(&rect) {
            draw_obstacle(view, &rect, surface);
        }
    }

    draw_player(view, surface);
}

/// Fixed star pattern drifting slowly with the camera
fn draw_stars<S: Surface + ?Sized>(view: &FrameView, surface: &mut S) {
    let Viewport { width, height } = view.viewport;
    if width <= 0.0 || height <= 0.0 {
        return;
    }
    for i in 0..STAR_COUNT {
        let x = (i as f32 * 97.0 + view.camera_x * STAR_PARALLAX).rem_euclid(width);
        let y = (i as f32 * 53.0).rem_euclid(height / 2.0);
        let size = (i % 3) as f32 + 1.0;
        surface.set_alpha(0.3 + (i % 5) as f32 * 0.1);
        surface.fill_rect(x, y, size, size, palette::STAR);
    }
    surface.set_alpha(1.0);
}

fn draw_platform<S: Surface + ?Sized>(view: &FrameView, rect: &Rect, surface: &mut S) {
    let p = view.to_screen(rect.pos);
    let (w, h) = (rect.size.width, rect.size.height);

    surface.set_alpha(0.3);
    surface.fill_rect(p.x + 5.0, p.y + 5.0, w, h, palette::SHADOW);
    surface.set_alpha(1.0);
    surface.fill_rect(p.x, p.y, w, h, palette::PLATFORM);
    surface.fill_rect(p.x, p.y, w, 4.0, palette::PLATFORM_EDGE);
}

/// Spike: a triangle with a lighter left facet
fn draw_obstacle<S: Surface + ?Sized>(view: &FrameView, rect: &Rect, surface: &mut S) {
    let p = view.to_screen(rect.pos);
    let (w, h) = (rect.size.width, rect.size.height);

    surface.fill_triangle(
        Vec2::new(p.x, p.y + h),
        Vec2::new(p.x + w / 2.0, p.y),
        Vec2::new(p.x + w, p.y + h),
        palette::OBSTACLE,
    );
    surface.fill_triangle(
        Vec2::new(p.x + 5.0, p.y + h),
        Vec2::new(p.x + w / 2.0, p.y + 5.0),
        Vec2::new(p.x + w / 2.0, p.y + h),
        palette::OBSTACLE_SHINE,
    );
}

fn draw_player<S: Surface + ?Sized>(view: &FrameView, surface: &mut S) {
    let player = view.player;
    let p = view.to_screen(player.pos);
    let (w, h) = (player.size.width, player.size.height);

    // Blink while invincible
    let alpha = if player.is_invincible() { 0.5 } else { 1.0 };
    surface.set_alpha(alpha);
    surface.fill_rect(p.x, p.y, w, h, palette::PLAYER);
    surface.fill_rect(p.x + 25.0, p.y + 12.0, 10.0, 10.0, palette::EYE);
    surface.fill_rect(p.x + 28.0, p.y + 15.0, 4.0, 4.0, palette::PUPIL);
    surface.fill_rect(p.x + 22.0, p.y + 28.0, 12.0, 4.0, palette::EYE);
    surface.set_alpha(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear,
        Alpha(f32),
        Rect(f32, f32, f32, f32, Color),
        Triangle(Vec2, Vec2, Vec2, Color),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn clear(&mut self, _color: Color, _width: f32, _height: f32) {
            self.ops.push(Op::Clear);
        }
        fn set_alpha(&mut self, alpha: f32) {
            self.ops.push(Op::Alpha(alpha));
        }
        fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
            self.ops.push(Op::Rect(x, y, width, height, color));
        }
        fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
            self.ops.push(Op::Triangle(a, b, c, color));
        }
    }

    #[test]
    fn test_color_css() {
        assert_eq!(palette::OBSTACLE.to_css(), "#ef4444");
        assert_eq!(Color(0x00_00ff).to_css(), "#0000ff");
    }

    #[test]
    fn test_render_translates_by_camera() {
        let mut state = GameState::new(3, Viewport::default());
        state.camera_x = 60.0;
        let mut recorder = Recorder::default();
        render(&FrameView::from_state(&state), &mut recorder);

        assert_eq!(recorder.ops[0], Op::Clear);
        let body = Op::Rect(
            state.player.pos.x - 60.0,
            state.player.pos.y,
            state.player.size.width,
            state.player.size.height,
            palette::PLAYER,
        );
        assert!(recorder.ops.contains(&body));
    }

    #[test]
    fn test_offscreen_entities_are_skipped() {
        let state = GameState::new(3, Viewport::default());
        let view = FrameView::from_state(&state);
        let mut recorder = Recorder::default();
        render(&view, &mut recorder);

        let platform_bodies = recorder
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Rect(_, _, _, _, c) if *c == palette::PLATFORM))
            .count();
        let visible = state
            .platforms
            .iter()
            .filter(|p| view.is_visible(&p.rect()))
            .count();
        assert_eq!(platform_bodies, visible);
        assert!(visible < state.platforms.len());
    }

    #[test]
    fn test_invincible_player_is_translucent() {
        let mut state = GameState::new(3, Viewport::default());
        state.player.invincibility_time = 0.5;
        let mut recorder = Recorder::default();
        render(&FrameView::from_state(&state), &mut recorder);

        let body = recorder
            .ops
            .iter()
            .position(|op| matches!(op, Op::Rect(_, _, _, _, c) if *c == palette::PLAYER))
            .unwrap();
        assert_eq!(recorder.ops[body - 1], Op::Alpha(0.5));
    }
}
