//! Scrolling entities
//!
//! Obstacles and clouds are plain values. Movement is a pure function from
//! the old value to the new one; the registry owns the only copies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::FRAME_MS;

/// Where an obstacle is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Top,
    Bottom,
}

/// A vertical barrier hanging from the top or standing on the ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal speed in pixels per nominal frame
    pub speed: f32,
    /// Set once the trailing edge is behind the player
    pub passed: bool,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    /// Move left and flag the pass. Returns the new value and whether this
    /// call was the one that flipped `passed`.
    pub fn advanced(self, delta_ms: f64, player_x: f32) -> (Self, bool) {
        let mut next = self;
        next.pos.x -= self.speed * frame_scale(delta_ms);

        let newly_passed = !self.passed && next.right() < player_x;
        next.passed = self.passed || newly_passed;
        (next, newly_passed)
    }

    pub fn is_offscreen(&self) -> bool {
        self.right() < 0.0
    }
}

/// Background decoration; never collides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl Cloud {
    pub fn advanced(self, delta_ms: f64) -> Self {
        let mut next = self;
        next.pos.x -= self.speed * frame_scale(delta_ms);
        next
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// How many nominal frames `delta_ms` represents
#[inline]
fn frame_scale(delta_ms: f64) -> f32 {
    (delta_ms.max(0.0) / FRAME_MS) as f32
}
