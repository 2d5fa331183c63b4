//! Per-tick simulation pipeline
//!
//! Order matters: breathe, scroll, spawn, collide, score. Rendering happens
//! afterwards in the caller and never feeds back into the outcome.

use super::collision::{CollisionKind, detect};
use super::state::Simulation;

/// What one tick produced
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    pub collision: Option<CollisionKind>,
    pub newly_passed: u32,
    pub spawned_obstacle: bool,
}

/// Advance the simulation by `delta_ms` of already-clamped time
pub fn tick(sim: &mut Simulation, delta_ms: f64, breaths_per_minute: u32) -> TickOutcome {
    let delta_ms = delta_ms.max(0.0);
    sim.ticks += 1;

    sim.breathing.advance(delta_ms, breaths_per_minute);

    let player_x = sim.breathing.player().x;
    let report = sim.entities.advance(delta_ms, player_x);

    let spawned = sim.spawner.spawn(&sim.field, sim.score.distance());
    if let Some(obstacle) = spawned.obstacle {
        sim.entities.push_obstacle(obstacle);
    }
    if let Some(cloud) = spawned.cloud {
        sim.entities.push_cloud(cloud);
    }

    let player_box = sim.breathing.player().bounds(&sim.field);
    let collision = detect(&player_box, sim.entities.obstacles(), sim.field.ground_y());

    sim.score.record(delta_ms, report.newly_passed);

    TickOutcome {
        collision,
        newly_passed: report.newly_passed,
        spawned_obstacle: spawned.obstacle.is_some(),
    }
}
