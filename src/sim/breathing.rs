//! Breathing-paced player trajectory
//!
//! The player is never steered directly. Its height follows a triangle wave
//! whose slopes come from the configured breathing rate: inhaling lifts the
//! balloon toward the top bound, exhaling lets it sink toward the bottom one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::PlayField;
use crate::consts::*;

/// Breathing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathPhase {
    Inhale,
    Exhale,
}

impl BreathPhase {
    /// Prompt shown to the player
    pub fn label(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe in",
            BreathPhase::Exhale => "Breathe out",
        }
    }
}

/// Durations derived from a breathing rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathTiming {
    pub cycle_ms: f64,
    pub inhale_ms: f64,
    pub exhale_ms: f64,
}

impl BreathTiming {
    pub fn from_rate(breaths_per_minute: u32) -> Self {
        let cycle_ms = 60_000.0 / breaths_per_minute.max(1) as f64;
        let inhale_ms = cycle_ms * INHALE_FRACTION;
        Self {
            cycle_ms,
            inhale_ms,
            exhale_ms: cycle_ms - inhale_ms,
        }
    }
}

/// Where the user is in their breath
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathingCycleState {
    /// Always the direction the balloon is moving
    pub phase: BreathPhase,
    /// 0-1 across the band toward the bound the balloon is heading for
    pub phase_progress: f64,
    /// Where a metronome at the current rate would be: elapsed time modulo
    /// the cycle. Drifts from `phase` once the balloon spans the full band.
    pub paced_phase: BreathPhase,
    /// 0-1 through the paced cycle at the current rate
    pub cycle_progress: f64,
}

/// The balloon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntity {
    /// Vertical position, percent of play-field height (top = 0)
    pub height_percent: f32,
    pub x: f32,
    pub size: f32,
}

impl Default for PlayerEntity {
    fn default() -> Self {
        Self {
            height_percent: START_HEIGHT_PERCENT,
            x: PLAYER_X,
            size: PLAYER_SIZE,
        }
    }
}

impl PlayerEntity {
    /// Top edge in world pixels
    pub fn y(&self, field: &PlayField) -> f32 {
        self.height_percent / 100.0 * field.height
    }

    pub fn bounds(&self, field: &PlayField) -> Aabb {
        Aabb::new(Vec2::new(self.x, self.y(field)), Vec2::splat(self.size))
    }
}

/// Owns the player and moves it with the breath
#[derive(Debug, Clone)]
pub struct BreathingController {
    player: PlayerEntity,
    direction: BreathPhase,
    cycle_elapsed_ms: f64,
    cycles_completed: u32,
    /// Rate used by the previous advance
    rate: Option<u32>,
}

impl Default for BreathingController {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathingController {
    pub fn new() -> Self {
        Self {
            player: PlayerEntity::default(),
            direction: BreathPhase::Inhale,
            cycle_elapsed_ms: 0.0,
            cycles_completed: 0,
            rate: None,
        }
    }

    pub fn player(&self) -> &PlayerEntity {
        &self.player
    }

    pub fn height_percent(&self) -> f32 {
        self.player.height_percent
    }

    /// Direction the balloon is currently travelling
    pub fn direction(&self) -> BreathPhase {
        self.direction
    }

    /// Paced cycles elapsed at the configured rate(s)
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Breath prompt and progress. The phase follows the balloon, which
    /// only turns around at the height bounds.
    pub fn cycle_state(&self) -> BreathingCycleState {
        let band = (MAX_HEIGHT_PERCENT - MIN_HEIGHT_PERCENT) as f64;
        let height = self.player.height_percent as f64;
        let phase_progress = match self.direction {
            BreathPhase::Inhale => (MAX_HEIGHT_PERCENT as f64 - height) / band,
            BreathPhase::Exhale => (height - MIN_HEIGHT_PERCENT as f64) / band,
        };
        let (paced_phase, cycle_progress) = match self.rate {
            Some(rate) => {
                let timing = BreathTiming::from_rate(rate);
                let paced = if self.cycle_elapsed_ms < timing.inhale_ms {
                    BreathPhase::Inhale
                } else {
                    BreathPhase::Exhale
                };
                (paced, self.cycle_elapsed_ms / timing.cycle_ms)
            }
            None => (BreathPhase::Inhale, 0.0),
        };
        BreathingCycleState {
            phase: self.direction,
            phase_progress: phase_progress.clamp(0.0, 1.0),
            paced_phase,
            cycle_progress: cycle_progress.clamp(0.0, 1.0),
        }
    }

    /// Advance the trajectory by `delta_ms` at the given rate.
    ///
    /// The rate only changes the slope, so switching it mid-session never
    /// makes the balloon jump. Time left over after hitting a bound keeps
    /// flowing in the new direction.
    pub fn advance(&mut self, delta_ms: f64, breaths_per_minute: u32) {
        let timing = BreathTiming::from_rate(breaths_per_minute);

        // Keep the same fraction of the cycle when the rate changes
        if let Some(previous) = self.rate.replace(breaths_per_minute) {
            if previous != breaths_per_minute {
                let old_cycle_ms = BreathTiming::from_rate(previous).cycle_ms;
                self.cycle_elapsed_ms *= timing.cycle_ms / old_cycle_ms;
            }
        }

        if delta_ms.is_nan() || delta_ms <= 0.0 {
            return;
        }

        self.cycle_elapsed_ms += delta_ms;
        while self.cycle_elapsed_ms >= timing.cycle_ms {
            self.cycle_elapsed_ms -= timing.cycle_ms;
            self.cycles_completed += 1;
        }

        let mut remaining = delta_ms;
        while remaining > 0.0 {
            let (slope, room) = match self.direction {
                BreathPhase::Inhale => (
                    BREATH_TRAVEL_PERCENT as f64 / timing.inhale_ms,
                    (self.player.height_percent - MIN_HEIGHT_PERCENT) as f64,
                ),
                BreathPhase::Exhale => (
                    BREATH_TRAVEL_PERCENT as f64 / timing.exhale_ms,
                    (MAX_HEIGHT_PERCENT - self.player.height_percent) as f64,
                ),
            };
            let time_to_bound = room.max(0.0) / slope;

            if remaining < time_to_bound {
                let step = (slope * remaining) as f32;
                match self.direction {
                    BreathPhase::Inhale => self.player.height_percent -= step,
                    BreathPhase::Exhale => self.player.height_percent += step,
                }
                remaining = 0.0;
            } else {
                remaining -= time_to_bound;
                match self.direction {
                    BreathPhase::Inhale => {
                        self.player.height_percent = MIN_HEIGHT_PERCENT;
                        self.direction = BreathPhase::Exhale;
                    }
                    BreathPhase::Exhale => {
                        self.player.height_percent = MAX_HEIGHT_PERCENT;
                        self.direction = BreathPhase::Inhale;
                    }
                }
            }
        }

        let height = self.player.height_percent;
        if !(MIN_HEIGHT_PERCENT..=MAX_HEIGHT_PERCENT).contains(&height) {
            log::warn!("Height {height} escaped its bounds, clamping");
            self.player.height_percent = height.clamp(MIN_HEIGHT_PERCENT, MAX_HEIGHT_PERCENT);
        }
    }
}
