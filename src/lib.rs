//! Balloon Journey - a breathing-paced obstacle course
//!
//! Core modules:
//! - `sim`: Deterministic simulation (breathing trajectory, spawning, collisions, score)
//! - `session`: Idle/Playing/Paused/Ended lifecycle and its side effects
//! - `renderer`: Pure scene projection plus drawing surfaces
//! - `audio`: Best-effort sound cues behind an explicit backend handle
//! - `persistence`: Session summary storage
//! - `settings`: Breathing rate and volume configuration
//! - `highscores` / `storage`: Local leaderboard and its LocalStorage backing

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod storage;

pub use error::{AudioError, PersistError, SessionError, SettingsError};
pub use highscores::HighScores;
pub use session::{FrameOutcome, SessionController, SessionPhase};
pub use settings::{Settings, VolumeLevel};

/// Game configuration constants
pub mod consts {
    /// Nominal frame duration that entity speeds are expressed against (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest delta a single tick may consume (after a backgrounded tab)
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

    /// Player vertical bounds, as a percentage of play-field height
    pub const MIN_HEIGHT_PERCENT: f32 = 20.0;
    pub const MAX_HEIGHT_PERCENT: f32 = 80.0;
    pub const START_HEIGHT_PERCENT: f32 = 50.0;
    /// Percentage points travelled during one inhale (and one exhale)
    pub const BREATH_TRAVEL_PERCENT: f32 = 30.0;
    /// Share of a breathing cycle spent inhaling
    pub const INHALE_FRACTION: f64 = 0.4;

    /// Breathing rate bounds (breaths per minute)
    pub const MIN_BREATHING_RATE: u32 = 4;
    pub const MAX_BREATHING_RATE: u32 = 10;
    pub const DEFAULT_BREATHING_RATE: u32 = 6;

    /// Player defaults
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_SIZE: f32 = 40.0;

    /// Height of the ground strip at the bottom of the play field
    pub const GROUND_HEIGHT: f32 = 40.0;

    /// Distance units gained per simulated millisecond
    pub const DISTANCE_PER_MS: f64 = 0.01;
    /// Score weights
    pub const SCORE_PER_DISTANCE: f64 = 10.0;
    pub const SCORE_PER_OBSTACLE: f64 = 5.0;

    /// Spawn tuning
    pub const OBSTACLE_BASE_PROBABILITY: f64 = 0.005;
    pub const OBSTACLE_DISTANCE_CAP: f64 = 1000.0;
    pub const OBSTACLE_DISTANCE_SCALE: f64 = 10000.0;
    pub const CLOUD_PROBABILITY: f64 = 0.01;
}
