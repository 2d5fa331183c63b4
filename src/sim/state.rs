//! Simulation state
//!
//! One authoritative struct per session. Presentation only reads it.

use serde::{Deserialize, Serialize};

use super::breathing::BreathingController;
use super::registry::EntityRegistry;
use super::score::ScoreAccumulator;
use super::spawn::ProceduralSpawner;
use crate::consts::GROUND_HEIGHT;

/// Size of the drawing area in world pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayField {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl PlayField {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Top of the ground strip
    pub fn ground_y(&self) -> f32 {
        self.height - GROUND_HEIGHT
    }
}

/// Final numbers of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u64,
    pub distance_traveled: f64,
    pub obstacles_avoided: u32,
    pub time_elapsed_seconds: u32,
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct Simulation {
    pub field: PlayField,
    pub breathing: BreathingController,
    pub entities: EntityRegistry,
    pub spawner: ProceduralSpawner,
    pub score: ScoreAccumulator,
    /// Ticks advanced this session
    pub ticks: u64,
}

impl Simulation {
    pub fn new(field: PlayField, spawner: ProceduralSpawner) -> Self {
        Self {
            field,
            breathing: BreathingController::new(),
            entities: EntityRegistry::new(),
            spawner,
            score: ScoreAccumulator::new(),
            ticks: 0,
        }
    }

    /// Fresh session on the same field
    pub fn reset(&mut self, spawner: ProceduralSpawner) {
        *self = Self::new(self.field, spawner);
    }

    /// Change the play-field size without touching anything in flight
    pub fn resize(&mut self, width: f32, height: f32) {
        self.field = PlayField::new(width.max(1.0), height.max(1.0));
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score.score(),
            distance_traveled: self.score.distance(),
            obstacles_avoided: self.score.obstacles_avoided(),
            time_elapsed_seconds: (self.score.survived_ms() / 1000.0).floor() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Obstacle;
    use glam::Vec2;

    #[test]
    fn test_resize_keeps_entities() {
        let mut sim = Simulation::new(PlayField::default(), ProceduralSpawner::disabled());
        sim.entities.push_obstacle(Obstacle {
            pos: Vec2::new(300.0, 0.0),
            size: Vec2::new(40.0, 120.0),
            speed: 2.0,
            passed: false,
        });
        sim.score.record(2_500.0, 1);

        sim.resize(1024.0, 768.0);
        assert_eq!(sim.field, PlayField::new(1024.0, 768.0));
        assert_eq!(sim.entities.obstacles().len(), 1);
        assert_eq!(sim.score.obstacles_avoided(), 1);
    }

    #[test]
    fn test_summary() {
        let mut sim = Simulation::new(PlayField::default(), ProceduralSpawner::disabled());
        sim.score.record(2_500.0, 1);
        let summary = sim.summary();
        assert_eq!(summary.score, 255);
        assert_eq!(summary.distance_traveled, 25.0);
        assert_eq!(summary.obstacles_avoided, 1);
        assert_eq!(summary.time_elapsed_seconds, 2);
    }

    #[test]
    fn test_reset_clears_registry() {
        let mut sim = Simulation::new(PlayField::new(640.0, 480.0), ProceduralSpawner::disabled());
        sim.entities.push_obstacle(Obstacle {
            pos: Vec2::new(300.0, 0.0),
            size: Vec2::new(40.0, 120.0),
            speed: 2.0,
            passed: false,
        });
        sim.ticks = 10;
        sim.reset(ProceduralSpawner::new(1));
        assert!(sim.entities.is_empty());
        assert_eq!(sim.ticks, 0);
        assert_eq!(sim.field.width, 640.0);
    }
}
