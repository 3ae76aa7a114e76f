//! Game launcher core: simulated downloads, controller input and gamepad focus navigation

pub mod catalog;
pub mod constants;
pub mod debounce;
pub mod downloads;
pub mod errors;
pub mod input;
pub mod nav;
pub mod settings;
pub mod types;
pub mod utils;
