//! Best journeys
//!
//! The ten best sessions, kept in LocalStorage on the web. Making the board is
//! what earns a finished session the success chime.

use serde::{Deserialize, Serialize};

use crate::sim::SessionSummary;
use crate::storage;

/// Board size
pub const MAX_HIGH_SCORES: usize = 10;

const STORAGE_KEY: &str = "balloon_journey_highscores";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub score: u64,
    /// Whole distance units
    pub distance: u64,
    pub obstacles_avoided: u32,
    /// Wall-clock ms since the Unix epoch
    pub timestamp: f64,
}

/// Entries sorted best first. Equal scores keep their arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a score would be inserted at
    fn slot(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// Zero never qualifies; otherwise the score must fit on the board
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0 && self.slot(score) < MAX_HIGH_SCORES
    }

    /// 1-based rank the score would get
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.qualifies(score).then(|| self.slot(score) + 1)
    }

    /// Insert a finished session, returning its 1-based rank if it made the board
    pub fn add_session(&mut self, summary: &SessionSummary, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(summary.score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score: summary.score,
                distance: summary.distance_traveled.max(0.0).floor() as u64,
                obstacles_avoided: summary.obstacles_avoided,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Stored board, or an empty one
    pub fn load() -> Self {
        match storage::load::<HighScores>(STORAGE_KEY) {
            Some(mut board) => {
                board.entries.sort_by(|a, b| b.score.cmp(&a.score));
                board.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", board.entries.len());
                board
            }
            None => Self::new(),
        }
    }

    pub fn save(&self) {
        if let Err(e) = storage::store(STORAGE_KEY, self) {
            log::warn!("Could not save high scores: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: u64) -> SessionSummary {
        SessionSummary {
            score,
            distance_traveled: score as f64 / 10.0,
            obstacles_avoided: 0,
            time_elapsed_seconds: 1,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let board = HighScores::new();
        assert!(!board.qualifies(0));
        assert!(board.qualifies(1));
    }

    #[test]
    fn test_ranks_descending() {
        let mut board = HighScores::new();
        assert_eq!(board.add_session(&summary(100), 1.0), Some(1));
        assert_eq!(board.add_session(&summary(300), 2.0), Some(1));
        assert_eq!(board.add_session(&summary(200), 3.0), Some(2));
        // Ties go after the existing entry
        assert_eq!(board.add_session(&summary(200), 4.0), Some(3));
        assert_eq!(board.top_score(), Some(300));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 200, 100]);
        assert_eq!(board.entries[1].distance, 20);
        assert_eq!(board.entries[1].timestamp, 3.0);
    }

    #[test]
    fn test_full_board() {
        let mut board = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            board.add_session(&summary(i * 10), i as f64);
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert!(!board.qualifies(10));
        assert_eq!(board.potential_rank(15), Some(MAX_HIGH_SCORES));
        assert_eq!(board.add_session(&summary(5), 0.0), None);
        assert_eq!(board.add_session(&summary(1_000), 0.0), Some(1));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_load_without_storage_is_empty() {
        assert!(HighScores::load().is_empty());
    }
}
