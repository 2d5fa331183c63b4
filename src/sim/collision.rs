//! Collision detection for rectangular entities
//!
//! Everything collides as an axis-aligned box. One hit ends the session, so
//! detection only needs to answer "did anything touch", not how deep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Obstacle;

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub const fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }
}

/// What ended the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Index into the registry's obstacle list at the time of the hit
    Obstacle(usize),
    Ground,
    Ceiling,
}

/// True iff the boxes overlap on both axes. Shared edges do not count.
#[inline]
pub fn collides(a: &Aabb, b: &Aabb) -> bool {
    let (a_max, b_max) = (a.max(), b.max());
    a.min.x < b_max.x && b.min.x < a_max.x && a.min.y < b_max.y && b.min.y < a_max.y
}

/// Check the player against the ground line and the top of the field
pub fn boundary_collision(player: &Aabb, ground_y: f32) -> Option<CollisionKind> {
    if player.bottom() > ground_y {
        Some(CollisionKind::Ground)
    } else if player.min.y < 0.0 {
        Some(CollisionKind::Ceiling)
    } else {
        None
    }
}

/// First collision of the player with an obstacle or boundary, if any
pub fn detect(player: &Aabb, obstacles: &[Obstacle], ground_y: f32) -> Option<CollisionKind> {
    obstacles
        .iter()
        .position(|o| collides(player, &o.bounds()))
        .map(CollisionKind::Obstacle)
        .or_else(|| boundary_collision(player, ground_y))
}
