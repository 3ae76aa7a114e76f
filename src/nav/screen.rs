//! Behaviour shared by every screen's focus machine

use super::cursor::NavDebounce;
use super::ports::NavPorts;
use super::types::{FocusProps, HapticPattern, NavInput, NavOutcome, RegionKey};
use std::time::Instant;
use tracing::trace;

const TICK_INTENSITY: f32 = 0.2;
const CONFIRM_INTENSITY: f32 = 0.5;
const CANCEL_INTENSITY: f32 = 0.35;
const BUMP_INTENSITY: f32 = 0.1;

pub trait ScreenNav {
    type Action;

    /// Pure transition: cursor and region changes only, no side effects
    fn apply(&mut self, input: NavInput) -> NavOutcome<Self::Action>;

    fn debounce_mut(&mut self) -> &mut NavDebounce;

    /// Focused region and index, `None` when the screen has nothing to focus
    fn focused(&self) -> Option<(RegionKey, usize)>;

    /// Debounced transition plus focus and haptic side effects
    fn feed(&mut self, input: NavInput, now: Instant, ports: &mut NavPorts<'_>) -> NavOutcome<Self::Action> {
        if !self.debounce_mut().gate(input).trigger(now) {
            return NavOutcome::Debounced;
        }

        let outcome = self.apply(input);
        trace!(?input, handled = outcome.is_handled(), "Nav input");

        match &outcome {
            NavOutcome::Moved | NavOutcome::Action(_) => {
                if let Some((region, index)) = self.focused() {
                    ports.focus_element(region, index);
                }
                if input == NavInput::Confirm {
                    ports.haptics.vibrate(HapticPattern::Confirm, CONFIRM_INTENSITY);
                } else {
                    ports.haptics.vibrate(HapticPattern::Tick, TICK_INTENSITY);
                }
            }
            NavOutcome::Back => ports.haptics.vibrate(HapticPattern::Cancel, CANCEL_INTENSITY),
            NavOutcome::Ignored if input == NavInput::Cancel => {
                ports.haptics.vibrate(HapticPattern::Bump, BUMP_INTENSITY)
            }
            NavOutcome::Ignored | NavOutcome::Debounced => {}
        }
        outcome
    }

    /// Render descriptor for `region[index]`
    fn props(&self, region: RegionKey, index: usize) -> FocusProps {
        let focused = self.focused();
        FocusProps {
            region,
            index,
            focused: focused == Some((region, index)),
            region_active: focused.is_some_and(|(r, _)| r == region),
        }
    }
}

impl<A> NavOutcome<A> {
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> NavOutcome<B> {
        match self {
            NavOutcome::Moved => NavOutcome::Moved,
            NavOutcome::Action(a) => NavOutcome::Action(f(a)),
            NavOutcome::Back => NavOutcome::Back,
            NavOutcome::Ignored => NavOutcome::Ignored,
            NavOutcome::Debounced => NavOutcome::Debounced,
        }
    }
}
