//! Scene rendering
//!
//! Rendering is split in two: [`render`] projects a read-only [`SceneView`]
//! into a flat list of [`DrawCommand`]s, and a [`RenderSurface`] replays them.
//! The projection never touches simulation state, so a frame can always be
//! skipped or drawn twice without changing the outcome.

pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use scene::{SceneView, render};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

/// RGBA colour, components 0-1
pub type Color = [f32; 4];

/// Palette
pub mod colors {
    use super::Color;

    pub const SKY: Color = [0.53, 0.81, 0.98, 1.0];
    pub const CLOUD: Color = [1.0, 1.0, 1.0, 0.85];
    pub const OBSTACLE: Color = [0.36, 0.25, 0.20, 1.0];
    pub const OBSTACLE_EDGE: Color = [0.24, 0.16, 0.12, 1.0];
    pub const BALLOON: Color = [0.91, 0.30, 0.24, 1.0];
    pub const BALLOON_HIGHLIGHT: Color = [1.0, 0.55, 0.45, 0.7];
    pub const TETHER: Color = [0.2, 0.2, 0.2, 1.0];
    pub const BASKET: Color = [0.55, 0.37, 0.20, 1.0];
    pub const GROUND: Color = [0.30, 0.60, 0.25, 1.0];
    pub const GROUND_STRIPE: Color = [0.24, 0.50, 0.20, 1.0];
}

/// One drawing primitive in world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface
    Clear { color: Color },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
    },
    Line {
        from: [f32; 2],
        to: [f32; 2],
        width: f32,
        color: Color,
    },
}

/// Something a frame can be drawn onto
pub trait RenderSurface {
    fn present(&mut self, commands: &[DrawCommand]);
}

/// Surface that keeps the last frame in memory (native runner, tests)
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    pub frames: u64,
    pub last_frame: Vec<DrawCommand>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for HeadlessSurface {
    fn present(&mut self, commands: &[DrawCommand]) {
        self.frames += 1;
        self.last_frame.clear();
        self.last_frame.extend_from_slice(commands);
    }
}

/// CSS colour string for a palette entry
pub fn css_color(color: Color) -> String {
    let [r, g, b, a] = color;
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("rgba({}, {}, {}, {})", byte(r), byte(g), byte(b), a.clamp(0.0, 1.0))
}
