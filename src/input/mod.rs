//! Controller input: raw reads, intent snapshots and the polling loop

mod adapter;
#[cfg(feature = "gamepad")]
mod gilrs_source;
mod poller;
mod types;

pub use adapter::{InputAdapter, PadSource};
#[cfg(feature = "gamepad")]
pub use gilrs_source::GilrsSource;
pub use poller::InputPoller;
pub use types::{ConnectionEvent, Intent, IntentSet, IntentSnapshot, PadButton, RawPadState, StickPos};
