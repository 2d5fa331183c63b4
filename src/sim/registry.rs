//! Live entity storage

use super::entity::{Cloud, Obstacle};

/// Result of one registry advance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Obstacles whose trailing edge crossed the player this tick
    pub newly_passed: u32,
    pub evicted: usize,
}

/// Sole owner of the obstacles and clouds in flight
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    obstacles: Vec<Obstacle>,
    clouds: Vec<Cloud>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn push_cloud(&mut self, cloud: Cloud) {
        self.clouds.push(cloud);
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.clouds.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty() && self.clouds.is_empty()
    }

    /// Scroll everything left, flag passes, then drop what left the screen.
    /// Pass flags are set before eviction so an obstacle is never evicted
    /// without having been counted.
    pub fn advance(&mut self, delta_ms: f64, player_x: f32) -> AdvanceReport {
        let mut report = AdvanceReport::default();

        for obstacle in &mut self.obstacles {
            let (next, newly_passed) = obstacle.advanced(delta_ms, player_x);
            *obstacle = next;
            if newly_passed {
                report.newly_passed += 1;
            }
        }
        for cloud in &mut self.clouds {
            *cloud = cloud.advanced(delta_ms);
        }

        let before = self.obstacles.len() + self.clouds.len();
        self.obstacles.retain(|o| !o.is_offscreen());
        self.clouds.retain(|c| !c.is_offscreen());
        report.evicted = before - (self.obstacles.len() + self.clouds.len());

        report
    }
}
