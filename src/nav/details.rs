//! Game details screen: one flat row of action buttons

use super::cursor::{NavDebounce, RegionCursor};
use super::screen::ScreenNav;
use super::types::{NavDirection, NavInput, NavOutcome, RegionKey};
use crate::settings::NavTiming;

pub const ACTIONS_REGION: RegionKey = "details.actions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsAction {
    Invoke(usize),
}

#[derive(Debug, Clone)]
pub struct DetailsNav {
    actions: RegionCursor,
    debounce: NavDebounce,
}

impl DetailsNav {
    pub fn new(timing: &NavTiming) -> Self {
        Self {
            actions: RegionCursor::default(),
            debounce: NavDebounce::new(timing),
        }
    }

    pub fn action_index(&self) -> usize {
        self.actions.index()
    }

    pub fn set_count(&mut self, actions: usize) {
        self.actions.set_len(actions);
    }
}

impl ScreenNav for DetailsNav {
    type Action = DetailsAction;

    fn apply(&mut self, input: NavInput) -> NavOutcome<DetailsAction> {
        let delta = match input {
            NavInput::Direction(NavDirection::Left | NavDirection::Up) => -1,
            NavInput::Direction(NavDirection::Right | NavDirection::Down) => 1,
            NavInput::Confirm if !self.actions.is_empty() => {
                return NavOutcome::Action(DetailsAction::Invoke(self.actions.index()))
            }
            NavInput::Cancel => return NavOutcome::Back,
            _ => return NavOutcome::Ignored,
        };
        if self.actions.wrap(delta) {
            NavOutcome::Moved
        } else {
            NavOutcome::Ignored
        }
    }

    fn debounce_mut(&mut self) -> &mut NavDebounce {
        &mut self.debounce
    }

    fn focused(&self) -> Option<(RegionKey, usize)> {
        (!self.actions.is_empty()).then(|| (ACTIONS_REGION, self.actions.index()))
    }
}
