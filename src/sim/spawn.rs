//! Procedural obstacle and cloud spawning
//!
//! Spawning is a per-tick coin flip rather than a fixed interval, which keeps
//! the obstacle cadence irregular. Obstacle odds ramp up with distance and
//! plateau at `OBSTACLE_DISTANCE_CAP`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Anchor, Cloud, Obstacle};
use super::state::PlayField;
use crate::consts::*;

/// Per-tick obstacle spawn chance at a given distance
pub fn obstacle_probability(distance: f64) -> f64 {
    OBSTACLE_BASE_PROBABILITY + distance.clamp(0.0, OBSTACLE_DISTANCE_CAP) / OBSTACLE_DISTANCE_SCALE
}

/// Entities produced by one spawn roll
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spawned {
    pub obstacle: Option<Obstacle>,
    pub cloud: Option<Cloud>,
}

/// Seeded spawner. Two spawners with the same seed emit the same stream.
#[derive(Debug, Clone)]
pub struct ProceduralSpawner {
    rng: Pcg32,
    obstacles_enabled: bool,
    clouds_enabled: bool,
}

impl ProceduralSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            obstacles_enabled: true,
            clouds_enabled: true,
        }
    }

    /// Spawner that never produces anything (scripted scenarios, demos)
    pub fn disabled() -> Self {
        Self {
            rng: Pcg32::seed_from_u64(0),
            obstacles_enabled: false,
            clouds_enabled: false,
        }
    }

    /// Keep decorative clouds but stop obstacles
    pub fn without_obstacles(mut self) -> Self {
        self.obstacles_enabled = false;
        self
    }

    /// Roll for this tick. Obstacles and clouds are independent.
    pub fn spawn(&mut self, field: &PlayField, distance: f64) -> Spawned {
        let mut spawned = Spawned::default();

        // Always draw both numbers so enabling one kind never shifts the other's stream
        let obstacle_roll: f64 = self.rng.random();
        let cloud_roll: f64 = self.rng.random();

        if self.obstacles_enabled && obstacle_roll < obstacle_probability(distance) {
            spawned.obstacle = Some(self.make_obstacle(field));
        }
        if self.clouds_enabled && cloud_roll < CLOUD_PROBABILITY {
            spawned.cloud = Some(self.make_cloud(field));
        }
        spawned
    }

    fn make_obstacle(&mut self, field: &PlayField) -> Obstacle {
        let width = self.rng.random_range(30.0..=50.0f32);
        let height = self.rng.random_range(100.0..=200.0f32);
        let anchor = if self.rng.random_bool(0.5) {
            Anchor::Top
        } else {
            Anchor::Bottom
        };
        let y = match anchor {
            Anchor::Top => 0.0,
            Anchor::Bottom => field.ground_y() - height,
        };

        Obstacle {
            pos: Vec2::new(field.width, y),
            size: Vec2::new(width, height),
            speed: self.rng.random_range(2.0..=3.0f32),
            passed: false,
        }
    }

    fn make_cloud(&mut self, field: &PlayField) -> Cloud {
        let width = self.rng.random_range(60.0..=110.0f32);
        let height = self.rng.random_range(25.0..=45.0f32);
        let y = self.rng.random_range(0.0..=(field.height * 0.5).max(1.0));

        Cloud {
            pos: Vec2::new(field.width, y),
            size: Vec2::new(width, height),
            speed: self.rng.random_range(0.5..=1.5f32),
        }
    }
}
