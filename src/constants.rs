//! Application constants and configuration defaults

pub const APP_NAME: &str = "padlaunch";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const GB: f64 = 1024.0 * 1024.0 * 1024.0;
pub const MB: f64 = 1024.0 * 1024.0;

// Download simulation
pub const TICK_MS: u64 = 1_000;
pub const GRACE_MS: u64 = 3_000;
pub const BASE_SPEED_MIN: f64 = 5.0 * MB;
pub const BASE_SPEED_MAX: f64 = 25.0 * MB;
pub const SPEED_JITTER: f64 = 0.5;
pub const MIN_SPEED: f64 = 64.0 * 1024.0;
pub const EVENT_CAPACITY: usize = 256;

/// Size bands in GB: (min, max)
pub const SMALL_BAND_GB: (f64, f64) = (0.5, 2.5);
pub const LARGE_BAND_GB: (f64, f64) = (20.0, 60.0);
pub const MEDIUM_BAND_GB: (f64, f64) = (5.0, 20.0);
pub const FALLBACK_SIZE_GB: f64 = 8.0;

/// Platform names treated as handheld/mobile for size estimation (lowercase substrings)
pub const HANDHELD_PLATFORMS: &[&str] = &[
    "switch", "3ds", "nintendo ds", "vita", "psp", "game boy", "gameboy", "ios", "android", "mobile",
];

/// Genres that pull an estimate into the large band (lowercase substrings)
pub const LARGE_GENRES: &[&str] = &["action", "rpg", "shooter", "adventure", "aaa", "open world"];

// Navigation
pub const DIRECTION_DEBOUNCE_MS: u64 = 180;
pub const ACTION_DEBOUNCE_MS: u64 = 400;
pub const HOME_PAGE_SIZE: usize = 6;

// Input
pub const POLL_HZ: u32 = 60;
pub const STICK_DEADZONE: f32 = 0.18;
pub const STICK_THRESHOLD: f32 = 0.6;
pub const BUTTON_DEBOUNCE_MS: u64 = 120;
pub const INTENT_CHANNEL_CAPACITY: usize = 32;
