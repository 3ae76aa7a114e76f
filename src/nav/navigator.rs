//! Screen stack and input routing.
//!
//! Only one focus machine exists for the visible screen at a time, and each
//! input goes to exactly one consumer: the modal when it is open, otherwise
//! the active screen.

use super::details::{DetailsAction, DetailsNav};
use super::downloads::{DownloadsAction, DownloadsNav};
use super::home::{HomeAction, HomeNav};
use super::modal::{ModalAction, ModalNav};
use super::ports::NavPorts;
use super::screen::ScreenNav;
use super::settings::{SettingsAction, SettingsNav};
use super::types::{NavInput, NavOutcome};
use crate::input::IntentSnapshot;
use crate::settings::NavTiming;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Details,
    Downloads,
    Settings,
}

/// Focus machine of the visible screen
#[derive(Debug, Clone)]
pub enum ActiveNav {
    Home(HomeNav),
    Details(DetailsNav),
    Downloads(DownloadsNav),
    Settings(SettingsNav),
}

impl ActiveNav {
    fn new(screen: Screen, timing: &NavTiming) -> Self {
        match screen {
            Screen::Home => ActiveNav::Home(HomeNav::new(timing)),
            Screen::Details => ActiveNav::Details(DetailsNav::new(timing)),
            Screen::Downloads => ActiveNav::Downloads(DownloadsNav::new(timing)),
            Screen::Settings => ActiveNav::Settings(SettingsNav::new(timing)),
        }
    }

    pub fn screen(&self) -> Screen {
        match self {
            ActiveNav::Home(_) => Screen::Home,
            ActiveNav::Details(_) => Screen::Details,
            ActiveNav::Downloads(_) => Screen::Downloads,
            ActiveNav::Settings(_) => Screen::Settings,
        }
    }

    fn feed(&mut self, input: NavInput, now: Instant, ports: &mut NavPorts<'_>) -> NavOutcome<NavEvent> {
        match self {
            ActiveNav::Home(nav) => nav.feed(input, now, ports).map(NavEvent::Home),
            ActiveNav::Details(nav) => nav.feed(input, now, ports).map(NavEvent::Details),
            ActiveNav::Downloads(nav) => nav.feed(input, now, ports).map(NavEvent::Downloads),
            ActiveNav::Settings(nav) => nav.feed(input, now, ports).map(NavEvent::Settings),
        }
    }
}

/// What the caller has to act on after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Home(HomeAction),
    Details(DetailsAction),
    Downloads(DownloadsAction),
    Settings(SettingsAction),
    Modal(ModalAction),
    ModalClosed,
    ScreenChanged { from: Screen, to: Screen },
}

impl NavEvent {
    /// Frame processing ends once the consumer has changed
    fn ends_frame(&self) -> bool {
        matches!(self, NavEvent::ModalClosed | NavEvent::ScreenChanged { .. })
    }
}

#[derive(Debug)]
pub struct Navigator {
    timing: NavTiming,
    stack: Vec<Screen>,
    active: ActiveNav,
    modal: Option<ModalNav>,
}

impl Navigator {
    pub fn new(timing: NavTiming) -> Self {
        Self {
            active: ActiveNav::new(Screen::Home, &timing),
            timing,
            stack: vec![Screen::Home],
            modal: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.active.screen()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn active(&self) -> &ActiveNav {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveNav {
        &mut self.active
    }

    pub fn home_mut(&mut self) -> Option<&mut HomeNav> {
        match &mut self.active {
            ActiveNav::Home(nav) => Some(nav),
            _ => None,
        }
    }

    pub fn details_mut(&mut self) -> Option<&mut DetailsNav> {
        match &mut self.active {
            ActiveNav::Details(nav) => Some(nav),
            _ => None,
        }
    }

    pub fn downloads_mut(&mut self) -> Option<&mut DownloadsNav> {
        match &mut self.active {
            ActiveNav::Downloads(nav) => Some(nav),
            _ => None,
        }
    }

    pub fn settings_mut(&mut self) -> Option<&mut SettingsNav> {
        match &mut self.active {
            ActiveNav::Settings(nav) => Some(nav),
            _ => None,
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_some()
    }

    pub fn modal_mut(&mut self) -> Option<&mut ModalNav> {
        self.modal.as_mut()
    }

    /// Show `screen` on top of the stack. The previous screen's focus state is dropped.
    pub fn push(&mut self, screen: Screen) -> NavEvent {
        let from = self.screen();
        self.modal = None;
        self.stack.push(screen);
        self.active = ActiveNav::new(screen, &self.timing);
        info!(from = ?from, to = ?screen, depth = self.stack.len(), "Screen pushed");
        NavEvent::ScreenChanged { from, to: screen }
    }

    /// Return to the parent screen with fresh focus state. `None` at the root.
    pub fn pop(&mut self) -> Option<NavEvent> {
        if self.stack.len() <= 1 {
            return None;
        }
        let from = self.stack.pop()?;
        let to = *self.stack.last()?;
        self.modal = None;
        self.active = ActiveNav::new(to, &self.timing);
        info!(from = ?from, to = ?to, depth = self.stack.len(), "Screen popped");
        Some(NavEvent::ScreenChanged { from, to })
    }

    /// Open the modal with its cursor at the first tab. Reopening starts over.
    pub fn open_modal(&mut self) -> &mut ModalNav {
        debug!(screen = ?self.screen(), "Modal opened");
        self.modal.insert(ModalNav::new(&self.timing))
    }

    pub fn close_modal(&mut self) -> bool {
        let was_open = self.modal.take().is_some();
        if was_open {
            debug!(screen = ?self.screen(), "Modal closed");
        }
        was_open
    }

    /// Route one input to the current consumer
    pub fn handle_input(&mut self, input: NavInput, now: Instant, ports: &mut NavPorts<'_>) -> Option<NavEvent> {
        if let Some(modal) = self.modal.as_mut() {
            return match modal.feed(input, now, ports) {
                NavOutcome::Action(action) => Some(NavEvent::Modal(action)),
                NavOutcome::Back => {
                    self.close_modal();
                    Some(NavEvent::ModalClosed)
                }
                NavOutcome::Moved | NavOutcome::Ignored | NavOutcome::Debounced => None,
            };
        }

        match self.active.feed(input, now, ports) {
            NavOutcome::Action(event) => Some(event),
            NavOutcome::Back => self.pop(),
            NavOutcome::Moved | NavOutcome::Ignored | NavOutcome::Debounced => None,
        }
    }

    /// Route every input of a controller frame. Inputs after a modal close or
    /// screen change in the same frame are dropped.
    pub fn handle_frame(&mut self, snapshot: &IntentSnapshot, now: Instant, ports: &mut NavPorts<'_>) -> Vec<NavEvent> {
        let mut events = Vec::new();
        for input in NavInput::from_snapshot(snapshot) {
            if let Some(event) = self.handle_input(input, now, ports) {
                let ends = event.ends_frame();
                events.push(event);
                if ends {
                    break;
                }
            }
        }
        events
    }
}
