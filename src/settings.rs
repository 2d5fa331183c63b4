//! Player settings and preferences
//!
//! Persisted in LocalStorage on the web; read from an optional JSON file on native.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BREATHING_RATE, MAX_BREATHING_RATE, MIN_BREATHING_RATE};
use crate::error::SettingsError;
#[cfg(target_arch = "wasm32")]
use crate::storage;

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "balloon_journey_settings";

/// Volume levels for the audio side channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    Off,
    Low,
    #[default]
    Medium,
}

impl VolumeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeLevel::Off => "Off",
            VolumeLevel::Low => "Low",
            VolumeLevel::Medium => "Medium",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "mute" => Some(VolumeLevel::Off),
            "low" => Some(VolumeLevel::Low),
            "medium" | "med" => Some(VolumeLevel::Medium),
            _ => None,
        }
    }

    /// Linear gain applied to every cue
    pub fn gain(&self) -> f32 {
        match self {
            VolumeLevel::Off => 0.0,
            VolumeLevel::Low => 0.3,
            VolumeLevel::Medium => 0.6,
        }
    }

    pub fn is_muted(&self) -> bool {
        *self == VolumeLevel::Off
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Breaths per minute driving the balloon (4-10)
    pub breathing_rate_per_minute: u32,
    pub volume: VolumeLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            breathing_rate_per_minute: DEFAULT_BREATHING_RATE,
            volume: VolumeLevel::Medium,
        }
    }
}

impl Settings {
    /// Parse and normalize settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.normalized()
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Clamp the breathing rate into its supported range. Zero is rejected.
    pub fn normalized(mut self) -> Result<Self, SettingsError> {
        let rate = self.breathing_rate_per_minute;
        if rate == 0 {
            return Err(SettingsError::InvalidRate(rate));
        }
        let clamped = rate.clamp(MIN_BREATHING_RATE, MAX_BREATHING_RATE);
        if clamped != rate {
            log::warn!("Breathing rate {rate} out of range, using {clamped}");
            self.breathing_rate_per_minute = clamped;
        }
        Ok(self)
    }

    /// Set the rate, clamped into range
    pub fn set_breathing_rate(&mut self, rate: u32) {
        self.breathing_rate_per_minute = rate.clamp(MIN_BREATHING_RATE, MAX_BREATHING_RATE);
    }

    pub fn set_volume_str(&mut self, level: &str) -> Result<(), SettingsError> {
        self.volume = VolumeLevel::from_str(level)
            .ok_or_else(|| SettingsError::UnknownVolume(level.to_string()))?;
        Ok(())
    }

    /// Environment variable naming a native settings file
    pub const SETTINGS_PATH_ENV: &'static str = "BALLOON_JOURNEY_SETTINGS";

    /// Stored preferences, or defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = storage::load::<Settings>(STORAGE_KEY).map(Settings::normalized);
        match stored {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        if let Err(e) = storage::store(STORAGE_KEY, self) {
            log::warn!("Could not save settings: {e}");
        }
    }

    /// Read settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `BALLOON_JOURNEY_SETTINGS` if set, defaults otherwise
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(Self::SETTINGS_PATH_ENV) else {
            return Self::default();
        };
        match Self::load_from(std::path::Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.to_string_lossy());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Native settings are read-only
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
