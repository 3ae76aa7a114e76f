//! Settings screen: category list, the category's options and a button row

use super::cursor::{settle_region, NavDebounce, RegionCursor};
use super::screen::ScreenNav;
use super::types::{NavDirection, NavInput, NavOutcome, RegionKey};
use crate::settings::NavTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRegion {
    Categories,
    Options,
    Buttons,
}

impl SettingsRegion {
    const CHAIN: [SettingsRegion; 3] = [
        SettingsRegion::Categories,
        SettingsRegion::Options,
        SettingsRegion::Buttons,
    ];

    pub fn key(self) -> RegionKey {
        match self {
            SettingsRegion::Categories => "settings.categories",
            SettingsRegion::Options => "settings.options",
            SettingsRegion::Buttons => "settings.buttons",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    SelectCategory(usize),
    ToggleOption(usize),
    Button(usize),
}

#[derive(Debug, Clone)]
pub struct SettingsNav {
    region: SettingsRegion,
    categories: RegionCursor,
    options: RegionCursor,
    buttons: RegionCursor,
    debounce: NavDebounce,
}

impl SettingsNav {
    pub fn new(timing: &NavTiming) -> Self {
        Self {
            region: SettingsRegion::Categories,
            categories: RegionCursor::default(),
            options: RegionCursor::default(),
            buttons: RegionCursor::default(),
            debounce: NavDebounce::new(timing),
        }
    }

    pub fn region(&self) -> SettingsRegion {
        self.region
    }

    pub fn category_index(&self) -> usize {
        self.categories.index()
    }

    pub fn option_index(&self) -> usize {
        self.options.index()
    }

    pub fn button_index(&self) -> usize {
        self.buttons.index()
    }

    /// `options` is the option count of the selected category
    pub fn set_counts(&mut self, categories: usize, options: usize, buttons: usize) {
        self.categories.set_len(categories);
        self.options.set_len(options);
        self.buttons.set_len(buttons);
        self.region = settle_region(&SettingsRegion::CHAIN, self.region, |r| !self.cursor(r).is_empty());
    }

    fn cursor(&self, region: SettingsRegion) -> &RegionCursor {
        match region {
            SettingsRegion::Categories => &self.categories,
            SettingsRegion::Options => &self.options,
            SettingsRegion::Buttons => &self.buttons,
        }
    }

    fn enter(&mut self, region: SettingsRegion) -> NavOutcome<SettingsAction> {
        if self.cursor(region).is_empty() {
            return NavOutcome::Ignored;
        }
        self.region = region;
        NavOutcome::Moved
    }

    fn moved(changed: bool) -> NavOutcome<SettingsAction> {
        if changed {
            NavOutcome::Moved
        } else {
            NavOutcome::Ignored
        }
    }

    fn navigate(&mut self, direction: NavDirection) -> NavOutcome<SettingsAction> {
        match (self.region, direction) {
            (SettingsRegion::Categories, NavDirection::Up) => Self::moved(self.categories.wrap(-1)),
            (SettingsRegion::Categories, NavDirection::Down) => Self::moved(self.categories.wrap(1)),
            (SettingsRegion::Categories, NavDirection::Right) => self.enter(SettingsRegion::Options),
            (SettingsRegion::Categories, NavDirection::Left) => NavOutcome::Ignored,

            (SettingsRegion::Options, NavDirection::Up) => Self::moved(self.options.step(-1)),
            (SettingsRegion::Options, NavDirection::Down) if self.options.at_end() => {
                self.enter(SettingsRegion::Buttons)
            }
            (SettingsRegion::Options, NavDirection::Down) => Self::moved(self.options.step(1)),
            (SettingsRegion::Options, NavDirection::Left) => self.enter(SettingsRegion::Categories),
            (SettingsRegion::Options, NavDirection::Right) => NavOutcome::Ignored,

            (SettingsRegion::Buttons, NavDirection::Left) => Self::moved(self.buttons.wrap(-1)),
            (SettingsRegion::Buttons, NavDirection::Right) => Self::moved(self.buttons.wrap(1)),
            (SettingsRegion::Buttons, NavDirection::Up) => self.up_from_buttons(),
            (SettingsRegion::Buttons, NavDirection::Down) => NavOutcome::Ignored,
        }
    }

    fn up_from_buttons(&mut self) -> NavOutcome<SettingsAction> {
        match self.enter(SettingsRegion::Options) {
            NavOutcome::Ignored => self.enter(SettingsRegion::Categories),
            moved => moved,
        }
    }

    fn select_category(&mut self, index: usize) -> NavOutcome<SettingsAction> {
        self.options.reset();
        NavOutcome::Action(SettingsAction::SelectCategory(index))
    }

    fn confirm(&mut self) -> NavOutcome<SettingsAction> {
        if self.cursor(self.region).is_empty() {
            return NavOutcome::Ignored;
        }
        match self.region {
            SettingsRegion::Categories => {
                let outcome = self.select_category(self.categories.index());
                self.enter(SettingsRegion::Options);
                outcome
            }
            SettingsRegion::Options => NavOutcome::Action(SettingsAction::ToggleOption(self.options.index())),
            SettingsRegion::Buttons => NavOutcome::Action(SettingsAction::Button(self.buttons.index())),
        }
    }

    fn cancel(&mut self) -> NavOutcome<SettingsAction> {
        match self.region {
            SettingsRegion::Buttons => self.up_from_buttons(),
            SettingsRegion::Options => self.enter(SettingsRegion::Categories),
            SettingsRegion::Categories => NavOutcome::Back,
        }
    }

    fn cycle_category(&mut self, delta: i32) -> NavOutcome<SettingsAction> {
        if !self.categories.wrap(delta) {
            return NavOutcome::Ignored;
        }
        self.select_category(self.categories.index())
    }
}

impl ScreenNav for SettingsNav {
    type Action = SettingsAction;

    fn apply(&mut self, input: NavInput) -> NavOutcome<SettingsAction> {
        match input {
            NavInput::Direction(direction) => self.navigate(direction),
            NavInput::Confirm => self.confirm(),
            NavInput::Cancel => self.cancel(),
            NavInput::Menu => NavOutcome::Ignored,
            NavInput::TabPrev => self.cycle_category(-1),
            NavInput::TabNext => self.cycle_category(1),
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

    fn settings() -> SettingsNav {
        let mut nav = SettingsNav::new(&NavTiming::default());
        nav.set_counts(3, 2, 2);
        nav
    }

    #[test]
    fn test_categories_wrap_and_confirm_focuses_options() {
        let mut nav = settings();
        nav.apply(UP);
        assert_eq!(nav.category_index(), 2);
        assert_eq!(nav.apply(LEFT), NavOutcome::Ignored);

        assert_eq!(nav.apply(NavInput::Confirm), NavOutcome::Action(SettingsAction::SelectCategory(2)));
        assert_eq!(nav.region(), SettingsRegion::Options);
    }

    #[test]
    fn test_options_clamp_then_fall_into_buttons() {
        let mut nav = settings();
        nav.apply(RIGHT);
        assert_eq!(nav.apply(UP), NavOutcome::Ignored);
        nav.apply(DOWN);
        assert_eq!(nav.option_index(), 1);

        assert_eq!(nav.apply(DOWN), NavOutcome::Moved);
        assert_eq!(nav.region(), SettingsRegion::Buttons);

        nav.apply(LEFT);
        assert_eq!(nav.button_index(), 1);
        assert_eq!(nav.apply(NavInput::Confirm), NavOutcome::Action(SettingsAction::Button(1)));

        nav.apply(UP);
        assert_eq!(nav.region(), SettingsRegion::Options);
        assert_eq!(nav.apply(NavInput::Confirm), NavOutcome::Action(SettingsAction::ToggleOption(1)));
        nav.apply(LEFT);
        assert_eq!(nav.region(), SettingsRegion::Categories);
    }

    #[test]
    fn test_bumpers_cycle_categories() {
        let mut nav = settings();
        nav.apply(RIGHT);
        nav.apply(DOWN);
        assert_eq!(nav.apply(NavInput::TabPrev), NavOutcome::Action(SettingsAction::SelectCategory(2)));
        assert_eq!(nav.option_index(), 0);
        assert_eq!(nav.region(), SettingsRegion::Options);
    }

    #[test]
    fn test_cancel_unwind() {
        let mut nav = settings();
        nav.apply(RIGHT);
        nav.apply(DOWN);
        nav.apply(DOWN);
        assert_eq!(nav.region(), SettingsRegion::Buttons);

        nav.apply(NavInput::Cancel);
        assert_eq!(nav.region(), SettingsRegion::Options);
        nav.apply(NavInput::Cancel);
        assert_eq!(nav.region(), SettingsRegion::Categories);
        assert_eq!(nav.apply(NavInput::Cancel), NavOutcome::Back);
    }

    #[test]
    fn test_category_without_options() {
        let mut nav = settings();
        nav.apply(RIGHT);
        nav.set_counts(3, 0, 2);
        assert_eq!(nav.region(), SettingsRegion::Categories);
        assert_eq!(nav.apply(RIGHT), NavOutcome::Ignored);
    }
}
