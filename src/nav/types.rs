//! Focus and navigation types for gamepad UI navigation

use crate::input::{Intent, IntentSnapshot};

/// Direction of navigation input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// One navigation input delivered to a screen machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    Direction(NavDirection),
    Confirm,
    Cancel,
    Menu,
    TabPrev,
    TabNext,
}

impl NavInput {
    /// Directions repeat while held; everything else is a discrete action
    pub fn is_direction(self) -> bool {
        matches!(self, NavInput::Direction(_))
    }

    /// Inputs carried by one controller frame.
    ///
    /// Directions come from the held state so a held stick repeats at the
    /// direction debounce rate; buttons only fire on a fresh press.
    pub fn from_snapshot(snapshot: &IntentSnapshot) -> Vec<NavInput> {
        let mut inputs = Vec::new();
        if !snapshot.connected {
            return inputs;
        }

        for (intent, dir) in [
            (Intent::Up, NavDirection::Up),
            (Intent::Down, NavDirection::Down),
            (Intent::Left, NavDirection::Left),
            (Intent::Right, NavDirection::Right),
        ] {
            if snapshot.pressed.contains(intent) {
                inputs.push(NavInput::Direction(dir));
            }
        }

        for intent in snapshot.just_pressed.iter() {
            let input = match intent {
                Intent::Confirm => NavInput::Confirm,
                Intent::Cancel | Intent::Back => NavInput::Cancel,
                Intent::Menu => NavInput::Menu,
                Intent::LeftBumper => NavInput::TabPrev,
                Intent::RightBumper => NavInput::TabNext,
                Intent::Up | Intent::Down | Intent::Left | Intent::Right => continue,
            };
            if !inputs.contains(&input) {
                inputs.push(input);
            }
        }
        inputs
    }
}

/// What a screen machine did with an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome<A> {
    /// Cursor or focus region changed
    Moved,
    /// Confirm (or a tab switch) produced a screen action for the caller to run
    Action(A),
    /// Cancel at the root: leave this screen
    Back,
    /// Nothing to do at this edge
    Ignored,
    /// Dropped by the debounce window
    Debounced,
}

impl<A> NavOutcome<A> {
    pub fn is_handled(&self) -> bool {
        !matches!(self, NavOutcome::Ignored | NavOutcome::Debounced)
    }
}

/// Stable name of a focus region, e.g. "downloads.filters"
pub type RegionKey = &'static str;

/// Opaque reference to a focusable element, issued by the focus registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusHandle {
    pub region: RegionKey,
    pub index: usize,
}

/// Render-layer descriptor for one item of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusProps {
    pub region: RegionKey,
    pub index: usize,
    pub focused: bool,
    /// Focused region, regardless of which item
    pub region_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    Tick,
    Confirm,
    Cancel,
    /// Input had nowhere to go
    Bump,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::IntentSet;

    #[test]
    fn test_snapshot_translation() {
        let snapshot = IntentSnapshot {
            pressed: [Intent::Right, Intent::Confirm].into_iter().collect(),
            just_pressed: [Intent::Confirm].into_iter().collect(),
            connected: true,
            ..IntentSnapshot::default()
        };
        assert_eq!(
            NavInput::from_snapshot(&snapshot),
            vec![NavInput::Direction(NavDirection::Right), NavInput::Confirm]
        );
    }

    #[test]
    fn test_held_button_without_fresh_press_is_silent() {
        let snapshot = IntentSnapshot {
            pressed: [Intent::Confirm].into_iter().collect(),
            just_pressed: IntentSet::EMPTY,
            connected: true,
            ..IntentSnapshot::default()
        };
        assert!(NavInput::from_snapshot(&snapshot).is_empty());
    }

    #[test]
    fn test_back_and_cancel_collapse() {
        let snapshot = IntentSnapshot {
            just_pressed: [Intent::Cancel, Intent::Back].into_iter().collect(),
            connected: true,
            ..IntentSnapshot::default()
        };
        assert_eq!(NavInput::from_snapshot(&snapshot), vec![NavInput::Cancel]);
    }

    #[test]
    fn test_disconnected_snapshot_yields_nothing() {
        let snapshot = IntentSnapshot {
            pressed: [Intent::Up].into_iter().collect(),
            ..IntentSnapshot::neutral(false)
        };
        assert!(NavInput::from_snapshot(&snapshot).is_empty());
    }
}
