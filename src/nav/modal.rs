//! Tabbed modal overlay

use super::cursor::{settle_region, NavDebounce, RegionCursor};
use super::screen::ScreenNav;
use super::types::{NavDirection, NavInput, NavOutcome, RegionKey};
use crate::settings::NavTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalRegion {
    Tabs,
    Content,
}

impl ModalRegion {
    const CHAIN: [ModalRegion; 2] = [ModalRegion::Tabs, ModalRegion::Content];

    pub fn key(self) -> RegionKey {
        match self {
            ModalRegion::Tabs => "modal.tabs",
            ModalRegion::Content => "modal.content",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    SelectTab(usize),
    Activate { tab: usize, item: usize },
}

/// `NavOutcome::Back` from the modal means close it
#[derive(Debug, Clone)]
pub struct ModalNav {
    region: ModalRegion,
    tabs: RegionCursor,
    content: RegionCursor,
    debounce: NavDebounce,
}

impl ModalNav {
    pub fn new(timing: &NavTiming) -> Self {
        Self {
            region: ModalRegion::Tabs,
            tabs: RegionCursor::default(),
            content: RegionCursor::default(),
            debounce: NavDebounce::new(timing),
        }
    }

    pub fn region(&self) -> ModalRegion {
        self.region
    }

    pub fn tab(&self) -> usize {
        self.tabs.index()
    }

    pub fn item(&self) -> usize {
        self.content.index()
    }

    /// `content` is the item count of the current tab
    pub fn set_counts(&mut self, tabs: usize, content: usize) {
        self.tabs.set_len(tabs);
        self.content.set_len(content);
        self.region = settle_region(&ModalRegion::CHAIN, self.region, |r| !self.cursor(r).is_empty());
    }

    fn cursor(&self, region: ModalRegion) -> &RegionCursor {
        match region {
            ModalRegion::Tabs => &self.tabs,
            ModalRegion::Content => &self.content,
        }
    }

    fn enter(&mut self, region: ModalRegion) -> NavOutcome<ModalAction> {
        if self.cursor(region).is_empty() {
            return NavOutcome::Ignored;
        }
        self.region = region;
        NavOutcome::Moved
    }

    fn switch_tab(&mut self, delta: i32) -> NavOutcome<ModalAction> {
        if !self.tabs.wrap(delta) {
            return NavOutcome::Ignored;
        }
        self.content.reset();
        NavOutcome::Action(ModalAction::SelectTab(self.tabs.index()))
    }

    fn navigate(&mut self, direction: NavDirection) -> NavOutcome<ModalAction> {
        match (self.region, direction) {
            (ModalRegion::Tabs, NavDirection::Left) => self.switch_tab(-1),
            (ModalRegion::Tabs, NavDirection::Right) => self.switch_tab(1),
            (ModalRegion::Tabs, NavDirection::Down) => self.enter(ModalRegion::Content),
            (ModalRegion::Tabs, NavDirection::Up) => NavOutcome::Ignored,

            (ModalRegion::Content, NavDirection::Up) if self.content.at_start() => self.enter(ModalRegion::Tabs),
            (ModalRegion::Content, NavDirection::Up) => step(&mut self.content, -1),
            (ModalRegion::Content, NavDirection::Down) => step(&mut self.content, 1),
            (ModalRegion::Content, NavDirection::Left | NavDirection::Right) => NavOutcome::Ignored,
        }
    }
}

fn step(cursor: &mut RegionCursor, delta: i32) -> NavOutcome<ModalAction> {
    if cursor.step(delta) {
        NavOutcome::Moved
    } else {
        NavOutcome::Ignored
    }
}

impl ScreenNav for ModalNav {
    type Action = ModalAction;

    fn apply(&mut self, input: NavInput) -> NavOutcome<ModalAction> {
        match input {
            NavInput::Direction(direction) => self.navigate(direction),
            NavInput::Confirm => match self.region {
                ModalRegion::Tabs => self.enter(ModalRegion::Content),
                ModalRegion::Content if !self.content.is_empty() => NavOutcome::Action(ModalAction::Activate {
                    tab: self.tabs.index(),
                    item: self.content.index(),
                }),
                ModalRegion::Content => NavOutcome::Ignored,
            },
            NavInput::Cancel => match self.region {
                ModalRegion::Content => match self.enter(ModalRegion::Tabs) {
                    NavOutcome::Ignored => NavOutcome::Back,
                    moved => moved,
                },
                ModalRegion::Tabs => NavOutcome::Back,
            },
            NavInput::Menu => NavOutcome::Ignored,
            NavInput::TabPrev => self.switch_tab(-1),
            NavInput::TabNext => self.switch_tab(1),
        }
    }

    fn debounce_mut(&mut self) -> &mut NavDebounce {
        &mut self.debounce
    }

    fn focused(&self) -> Option<(RegionKey, usize)> {
        let cursor = self.cursor(self.region);
        (!cursor.is_empty()).then(|| (self.region.key(), cursor.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: NavInput = NavInput::Direction(NavDirection::Up);
    const DOWN: NavInput = NavInput::Direction(NavDirection::Down);
    const LEFT: NavInput = NavInput::Direction(NavDirection::Left);
    const RIGHT: NavInput = NavInput::Direction(NavDirection::Right);

    fn modal(tabs: usize, content: usize) -> ModalNav {
        let mut nav = ModalNav::new(&NavTiming::default());
        nav.set_counts(tabs, content);
        nav
    }

    #[test]
    fn test_tabs_wrap() {
        let mut nav = modal(3, 4);
        assert_eq!(nav.apply(LEFT), NavOutcome::Action(ModalAction::SelectTab(2)));
        assert_eq!(nav.apply(RIGHT), NavOutcome::Action(ModalAction::SelectTab(0)));
        assert_eq!(nav.apply(UP), NavOutcome::Ignored);
    }

    #[test]
    fn test_content_edges() {
        let mut nav = modal(2, 3);
        assert_eq!(nav.apply(NavInput::Confirm), NavOutcome::Moved);
        assert_eq!(nav.region(), ModalRegion::Content);

        nav.apply(DOWN);
        nav.apply(DOWN);
        assert_eq!(nav.apply(DOWN), NavOutcome::Ignored);
        assert_eq!(nav.item(), 2);
        assert_eq!(nav.apply(LEFT), NavOutcome::Ignored);
        assert_eq!(
            nav.apply(NavInput::Confirm),
            NavOutcome::Action(ModalAction::Activate { tab: 0, item: 2 })
        );

        nav.apply(UP);
        nav.apply(UP);
        nav.apply(UP);
        assert_eq!(nav.region(), ModalRegion::Tabs);
    }

    #[test]
    fn test_bumpers_switch_tab_and_reset_content() {
        let mut nav = modal(3, 5);
        nav.apply(DOWN);
        nav.apply(DOWN);
        assert_eq!(nav.apply(NavInput::TabNext), NavOutcome::Action(ModalAction::SelectTab(1)));
        assert_eq!(nav.item(), 0);
        assert_eq!(nav.region(), ModalRegion::Content);
    }

    #[test]
    fn test_cancel_unwinds_then_closes() {
        let mut nav = modal(2, 3);
        nav.apply(DOWN);
        assert_eq!(nav.apply(NavInput::Cancel), NavOutcome::Moved);
        assert_eq!(nav.apply(NavInput::Cancel), NavOutcome::Back);
    }

    #[test]
    fn test_empty_tab_content() {
        let mut nav = modal(2, 3);
        nav.apply(DOWN);
        nav.set_counts(2, 0);
        assert_eq!(nav.region(), ModalRegion::Tabs);
        assert_eq!(nav.apply(NavInput::Confirm), NavOutcome::Ignored);
        assert_eq!(nav.apply(DOWN), NavOutcome::Ignored);
    }
}
