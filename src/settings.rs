//! User settings stored as settings.json in the app data directory

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub downloads: DownloadConfig,
    pub navigation: NavTiming,
    pub input: InputConfig,

    // Paths
    pub catalog_path: Option<String>,
}

/// Size range in GB a download estimate is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBand {
    pub min_gb: f64,
    pub max_gb: f64,
}

impl SizeBand {
    pub const fn new(min_gb: f64, max_gb: f64) -> Self {
        Self { min_gb, max_gb }
    }

    /// Finite, positive and non-empty
    pub fn is_valid(&self) -> bool {
        self.min_gb.is_finite() && self.max_gb.is_finite() && self.min_gb > 0.0 && self.max_gb >= self.min_gb
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeBands {
    /// Handheld platforms and indie titles
    pub small: SizeBand,
    /// Action, RPG and other big-budget genres
    pub large: SizeBand,
    pub medium: SizeBand,
    /// Used when the drawn size is not a finite positive number
    pub fallback_gb: f64,
}

impl Default for SizeBands {
    fn default() -> Self {
        Self {
            small: SizeBand::new(SMALL_BAND_GB.0, SMALL_BAND_GB.1),
            large: SizeBand::new(LARGE_BAND_GB.0, LARGE_BAND_GB.1),
            medium: SizeBand::new(MEDIUM_BAND_GB.0, MEDIUM_BAND_GB.1),
            fallback_gb: FALLBACK_SIZE_GB,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub tick_ms: u64,
    pub grace_ms: u64,
    /// Per-download base speed envelope, bytes/s
    pub base_speed_min: f64,
    pub base_speed_max: f64,
    /// Per-tick speed jitter as a fraction of the base speed
    pub jitter: f64,
    /// Floor for any sampled speed, bytes/s
    pub min_speed: f64,
    /// Probability that a downloading item fails on a given tick
    pub failure_rate: f64,
    /// Maximum number of simultaneously downloading items, `None` for no cap
    pub max_concurrent: Option<usize>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    pub size_bands: SizeBands,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            grace_ms: GRACE_MS,
            base_speed_min: BASE_SPEED_MIN,
            base_speed_max: BASE_SPEED_MAX,
            jitter: SPEED_JITTER,
            min_speed: MIN_SPEED,
            failure_rate: 0.0,
            max_concurrent: None,
            seed: None,
            size_bands: SizeBands::default(),
        }
    }
}

impl DownloadConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

/// Debounce windows for navigation input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavTiming {
    pub direction_ms: u64,
    pub action_ms: u64,
}

impl Default for NavTiming {
    fn default() -> Self {
        Self {
            direction_ms: DIRECTION_DEBOUNCE_MS,
            action_ms: ACTION_DEBOUNCE_MS,
        }
    }
}

impl NavTiming {
    pub fn direction(&self) -> Duration {
        Duration::from_millis(self.direction_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub poll_hz: u32,
    pub deadzone: f32,
    pub stick_threshold: f32,
    pub button_debounce_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_hz: POLL_HZ,
            deadzone: STICK_DEADZONE,
            stick_threshold: STICK_THRESHOLD,
            button_debounce_ms: BUTTON_DEBOUNCE_MS,
        }
    }
}

impl InputConfig {
    /// Poll period, never slower than 30Hz
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.poll_hz.max(30)))
    }

    pub fn button_debounce(&self) -> Duration {
        Duration::from_millis(self.button_debounce_ms)
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path.as_ref().map(PathBuf::from)
    }
}
