//! Re-entrancy guard that accepts at most one action per interval.
//!
//! The controller is polled at ~60Hz, so a held button would otherwise fire
//! an action every frame. Time is passed in explicitly; the cooldown ends
//! once `now` reaches the deadline armed by the last accepted call.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    cooldown_until: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cooldown_until: None,
        }
    }

    pub fn in_cooldown(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Run `action` unless in cooldown. Returns whether it ran.
    pub fn call<F: FnOnce()>(&mut self, now: Instant, action: F) -> bool {
        if !self.trigger(now) {
            return false;
        }
        action();
        true
    }

    /// Accept one event and arm the cooldown; false while cooling down.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.in_cooldown(now) {
            return false;
        }
        self.cooldown_until = Some(now + self.interval);
        true
    }

    /// Drop any pending cooldown immediately
    pub fn reset(&mut self) {
        self.cooldown_until = None;
    }
}
