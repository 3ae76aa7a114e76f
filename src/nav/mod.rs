//! Gamepad focus navigation: one state machine per screen plus the router

pub mod cursor;
pub mod details;
pub mod downloads;
pub mod home;
pub mod modal;
mod navigator;
mod ports;
mod screen;
pub mod settings;
mod types;

pub use navigator::{ActiveNav, NavEvent, Navigator, Screen};
pub use ports::{FocusRegistry, Haptics, NavPorts, NoHaptics, NullFocusRegistry};
pub use screen::ScreenNav;
pub use types::{FocusHandle, FocusProps, HapticPattern, NavDirection, NavInput, NavOutcome, RegionKey};
