//! Wire payload for a finished session

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::sim::SessionSummary;

/// One stored session, attributed to a user when one is signed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
    pub score: u64,
    /// Rounded down
    pub distance_traveled: u64,
    pub obstacles_avoided: u32,
    pub time_elapsed_seconds: u32,
}

impl SessionRecord {
    pub fn new(user_id: Option<String>, summary: &SessionSummary) -> Self {
        Self {
            user_id,
            score: summary.score,
            distance_traveled: summary.distance_traveled.max(0.0).floor() as u64,
            obstacles_avoided: summary.obstacles_avoided,
            time_elapsed_seconds: summary.time_elapsed_seconds,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }
}
