//! Score bookkeeping
//!
//! Distance is derived from total simulated time instead of being summed per
//! tick, and the score is recomputed from scratch every tick.

use crate::consts::{DISTANCE_PER_MS, SCORE_PER_DISTANCE, SCORE_PER_OBSTACLE};

/// Score as a pure function of distance and obstacles passed
pub fn compute_score(distance: f64, obstacles_avoided: u32) -> u64 {
    let raw = distance * SCORE_PER_DISTANCE + obstacles_avoided as f64 * SCORE_PER_OBSTACLE;
    raw.max(0.0).floor() as u64
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreAccumulator {
    survived_ms: f64,
    obstacles_avoided: u32,
    score: u64,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold in one tick's elapsed time and passes, then refresh the score
    pub fn record(&mut self, delta_ms: f64, newly_passed: u32) {
        self.survived_ms += delta_ms.max(0.0);
        self.obstacles_avoided += newly_passed;
        self.score = compute_score(self.distance(), self.obstacles_avoided);
    }

    pub fn distance(&self) -> f64 {
        self.survived_ms * DISTANCE_PER_MS
    }

    pub fn survived_ms(&self) -> f64 {
        self.survived_ms
    }

    pub fn obstacles_avoided(&self) -> u32 {
        self.obstacles_avoided
    }

    pub fn score(&self) -> u64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compute_score() {
        assert_eq!(compute_score(0.0, 0), 0);
        assert_eq!(compute_score(1.25, 0), 12);
        assert_eq!(compute_score(1.25, 2), 22);
    }

    #[test]
    fn test_distance_has_no_drift() {
        let mut acc = ScoreAccumulator::new();
        for _ in 0..1_000 {
            acc.record(16.0, 0);
        }
        assert_eq!(acc.distance(), 160.0);
        assert_eq!(acc.score(), 1_600);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut acc = ScoreAccumulator::new();
        acc.record(100.0, 1);
        acc.record(-50.0, 0);
        assert_eq!(acc.survived_ms(), 100.0);
        assert_eq!(acc.score(), 15);
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases(
            ticks in prop::collection::vec((0.0f64..100.0, 0u32..3), 1..500),
        ) {
            let mut acc = ScoreAccumulator::new();
            let mut last = 0;
            for (delta, passed) in ticks {
                acc.record(delta, passed);
                prop_assert!(acc.score() >= last);
                last = acc.score();
            }
        }
    }
}
