//! Guided breathing countdown
//!
//! The calmer sibling of the balloon game: no obstacles, just a phase timer
//! cycling through inhale, hold, exhale, hold. Driven by the same clock deltas.

use serde::{Deserialize, Serialize};

use crate::consts::INHALE_FRACTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacerPhase {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl PacerPhase {
    fn next(self) -> Self {
        match self {
            PacerPhase::Inhale => PacerPhase::HoldIn,
            PacerPhase::HoldIn => PacerPhase::Exhale,
            PacerPhase::Exhale => PacerPhase::HoldOut,
            PacerPhase::HoldOut => PacerPhase::Inhale,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PacerPhase::Inhale => "Breathe in",
            PacerPhase::HoldIn | PacerPhase::HoldOut => "Hold",
            PacerPhase::Exhale => "Breathe out",
        }
    }
}

/// Phase durations in milliseconds. Zero-length phases are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub inhale_ms: f64,
    pub hold_in_ms: f64,
    pub exhale_ms: f64,
    pub hold_out_ms: f64,
}

impl BreathingPattern {
    /// 4-4-4-4
    pub fn box_breathing() -> Self {
        Self {
            inhale_ms: 4_000.0,
            hold_in_ms: 4_000.0,
            exhale_ms: 4_000.0,
            hold_out_ms: 4_000.0,
        }
    }

    /// 4-7-8
    pub fn relaxing() -> Self {
        Self {
            inhale_ms: 4_000.0,
            hold_in_ms: 7_000.0,
            exhale_ms: 8_000.0,
            hold_out_ms: 0.0,
        }
    }

    /// Same inhale/exhale split as the balloon game, no holds
    pub fn from_rate(breaths_per_minute: u32) -> Self {
        let cycle_ms = 60_000.0 / breaths_per_minute.max(1) as f64;
        Self {
            inhale_ms: cycle_ms * INHALE_FRACTION,
            hold_in_ms: 0.0,
            exhale_ms: cycle_ms * (1.0 - INHALE_FRACTION),
            hold_out_ms: 0.0,
        }
    }

    /// `box`, `relax`, or a breathing rate per minute
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "box" => Some(Self::box_breathing()),
            "relax" | "4-7-8" => Some(Self::relaxing()),
            rate => rate
                .parse::<u32>()
                .ok()
                .filter(|&r| r > 0)
                .map(Self::from_rate),
        }
    }

    pub fn duration(&self, phase: PacerPhase) -> f64 {
        match phase {
            PacerPhase::Inhale => self.inhale_ms,
            PacerPhase::HoldIn => self.hold_in_ms,
            PacerPhase::Exhale => self.exhale_ms,
            PacerPhase::HoldOut => self.hold_out_ms,
        }
        .max(0.0)
    }

    pub fn cycle_ms(&self) -> f64 {
        [PacerPhase::Inhale, PacerPhase::HoldIn, PacerPhase::Exhale, PacerPhase::HoldOut]
            .iter()
            .map(|&p| self.duration(p))
            .sum()
    }
}

/// Countdown through a breathing pattern
#[derive(Debug, Clone)]
pub struct Pacer {
    pattern: BreathingPattern,
    phase: PacerPhase,
    elapsed_in_phase_ms: f64,
    cycles_completed: u32,
}

impl Pacer {
    pub fn new(pattern: BreathingPattern) -> Self {
        Self {
            pattern,
            phase: PacerPhase::Inhale,
            elapsed_in_phase_ms: 0.0,
            cycles_completed: 0,
        }
    }

    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    pub fn phase(&self) -> PacerPhase {
        self.phase
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Whole seconds left in the current phase, rounded up for display
    pub fn seconds_remaining(&self) -> u32 {
        let left = self.pattern.duration(self.phase) - self.elapsed_in_phase_ms;
        (left.max(0.0) / 1000.0).ceil() as u32
    }

    /// 0-1 through the current phase
    pub fn progress(&self) -> f64 {
        let duration = self.pattern.duration(self.phase);
        if duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed_in_phase_ms / duration).clamp(0.0, 1.0)
    }

    /// Advance the countdown. Returns the phase just entered, if any.
    pub fn advance(&mut self, delta_ms: f64) -> Option<PacerPhase> {
        if delta_ms.is_nan() || delta_ms <= 0.0 || self.pattern.cycle_ms() <= 0.0 {
            return None;
        }

        self.elapsed_in_phase_ms += delta_ms;
        let mut entered = None;
        while self.elapsed_in_phase_ms >= self.pattern.duration(self.phase) {
            self.elapsed_in_phase_ms -= self.pattern.duration(self.phase);
            if self.phase == PacerPhase::HoldOut {
                self.cycles_completed += 1;
            }
            self.phase = self.phase.next();
            if self.pattern.duration(self.phase) > 0.0 {
                entered = Some(self.phase);
            }
        }
        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_names() {
        assert_eq!(
            BreathingPattern::from_name("box"),
            Some(BreathingPattern::box_breathing())
        );
        assert_eq!(
            BreathingPattern::from_name("4-7-8"),
            Some(BreathingPattern::relaxing())
        );
        let six = BreathingPattern::from_name("6").unwrap();
        assert_eq!(six.cycle_ms(), 10_000.0);
        assert_eq!(six.hold_in_ms, 0.0);
        assert_eq!(BreathingPattern::from_name("0"), None);
        assert_eq!(BreathingPattern::from_name("fast"), None);
    }

    #[test]
    fn test_box_breathing_sequence() {
        let mut pacer = Pacer::new(BreathingPattern::box_breathing());
        assert_eq!(pacer.seconds_remaining(), 4);
        assert_eq!(pacer.advance(1_500.0), None);
        assert_eq!(pacer.seconds_remaining(), 3);
        assert_eq!(pacer.advance(2_500.0), Some(PacerPhase::HoldIn));
        assert_eq!(pacer.advance(4_000.0), Some(PacerPhase::Exhale));
        assert_eq!(pacer.advance(4_000.0), Some(PacerPhase::HoldOut));
        assert_eq!(pacer.advance(4_000.0), Some(PacerPhase::Inhale));
        assert_eq!(pacer.cycles_completed(), 1);
    }

    #[test]
    fn test_zero_length_phases_are_skipped() {
        let mut pacer = Pacer::new(BreathingPattern::from_rate(6));
        assert_eq!(pacer.advance(4_000.0), Some(PacerPhase::Exhale));
        assert_eq!(pacer.phase(), PacerPhase::Exhale);
        assert_eq!(pacer.advance(6_000.0), Some(PacerPhase::Inhale));
        assert_eq!(pacer.cycles_completed(), 1);
    }

    #[test]
    fn test_relaxing_pattern() {
        let pattern = BreathingPattern::relaxing();
        assert_eq!(pattern.cycle_ms(), 19_000.0);
        let mut pacer = Pacer::new(pattern);
        // A large delta crosses several phases; the last one wins
        assert_eq!(pacer.advance(12_000.0), Some(PacerPhase::Exhale));
        assert_eq!(pacer.seconds_remaining(), 7);
        assert!((pacer.progress() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_bad_deltas() {
        let mut pacer = Pacer::new(BreathingPattern::box_breathing());
        assert_eq!(pacer.advance(-10.0), None);
        assert_eq!(pacer.advance(f64::NAN), None);
        assert_eq!(pacer.progress(), 0.0);
    }

    #[test]
    fn test_empty_pattern_does_not_spin() {
        let mut pacer = Pacer::new(BreathingPattern {
            inhale_ms: 0.0,
            hold_in_ms: 0.0,
            exhale_ms: 0.0,
            hold_out_ms: 0.0,
        });
        assert_eq!(pacer.advance(1_000.0), None);
    }
}
