//! Home screen: hero carousel, game grid and a slide-in sidebar

use super::cursor::{settle_region, NavDebounce, RegionCursor};
use super::screen::ScreenNav;
use super::types::{NavDirection, NavInput, NavOutcome, RegionKey};
use crate::constants::HOME_PAGE_SIZE;
use crate::settings::NavTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeRegion {
    Hero,
    Games,
    Sidebar,
}

impl HomeRegion {
    const CHAIN: [HomeRegion; 3] = [HomeRegion::Hero, HomeRegion::Games, HomeRegion::Sidebar];

    pub fn key(self) -> RegionKey {
        match self {
            HomeRegion::Hero => "home.hero",
            HomeRegion::Games => "home.games",
            HomeRegion::Sidebar => "home.sidebar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAction {
    HeroAction(usize),
    OpenGame(usize),
    OpenSection(usize),
}

#[derive(Debug, Clone)]
pub struct HomeNav {
    region: HomeRegion,
    hero: RegionCursor,
    games: RegionCursor,
    sidebar: RegionCursor,
    page_size: usize,
    debounce: NavDebounce,
}

impl HomeNav {
    pub fn new(timing: &NavTiming) -> Self {
        Self {
            region: HomeRegion::Hero,
            hero: RegionCursor::default(),
            games: RegionCursor::default(),
            sidebar: RegionCursor::default(),
            page_size: HOME_PAGE_SIZE,
            debounce: NavDebounce::new(timing),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, i32::MAX as usize);
        self
    }

    pub fn region(&self) -> HomeRegion {
        self.region
    }

    pub fn hero_index(&self) -> usize {
        self.hero.index()
    }

    pub fn game_index(&self) -> usize {
        self.games.index()
    }

    pub fn sidebar_index(&self) -> usize {
        self.sidebar.index()
    }

    pub fn sidebar_open(&self) -> bool {
        self.region == HomeRegion::Sidebar
    }

    /// Update item counts, clamping cursors and leaving empty regions
    pub fn set_counts(&mut self, hero: usize, games: usize, sidebar: usize) {
        self.hero.set_len(hero);
        self.games.set_len(games);
        self.sidebar.set_len(sidebar);
        self.region = settle_region(&HomeRegion::CHAIN, self.region, |r| !self.cursor(r).is_empty());
    }

    fn cursor(&self, region: HomeRegion) -> &RegionCursor {
        match region {
            HomeRegion::Hero => &self.hero,
            HomeRegion::Games => &self.games,
            HomeRegion::Sidebar => &self.sidebar,
        }
    }

    fn enter(&mut self, region: HomeRegion) -> NavOutcome<HomeAction> {
        if self.cursor(region).is_empty() {
            return NavOutcome::Ignored;
        }
        self.region = region;
        NavOutcome::Moved
    }

    fn moved(changed: bool) -> NavOutcome<HomeAction> {
        if changed {
            NavOutcome::Moved
        } else {
            NavOutcome::Ignored
        }
    }

    fn navigate(&mut self, direction: NavDirection) -> NavOutcome<HomeAction> {
        match (self.region, direction) {
            (HomeRegion::Hero, NavDirection::Left) => Self::moved(self.hero.wrap(-1)),
            (HomeRegion::Hero, NavDirection::Right) => Self::moved(self.hero.wrap(1)),
            (HomeRegion::Hero, NavDirection::Down) => self.enter(HomeRegion::Games),
            (HomeRegion::Hero, NavDirection::Up) => NavOutcome::Ignored,

            (HomeRegion::Games, NavDirection::Left) if self.games.at_start() => {
                self.enter(HomeRegion::Sidebar)
            }
            (HomeRegion::Games, NavDirection::Left) => Self::moved(self.games.step(-1)),
            (HomeRegion::Games, NavDirection::Right) => Self::moved(self.games.wrap(1)),
            (HomeRegion::Games, NavDirection::Up) => self.enter(HomeRegion::Hero),
            (HomeRegion::Games, NavDirection::Down) => NavOutcome::Ignored,

            (HomeRegion::Sidebar, NavDirection::Up) => Self::moved(self.sidebar.wrap(-1)),
            (HomeRegion::Sidebar, NavDirection::Down) => Self::moved(self.sidebar.wrap(1)),
            (HomeRegion::Sidebar, NavDirection::Right) => self.enter(HomeRegion::Games),
            (HomeRegion::Sidebar, NavDirection::Left) => NavOutcome::Ignored,
        }
    }

    fn confirm(&self) -> NavOutcome<HomeAction> {
        let cursor = self.cursor(self.region);
        if cursor.is_empty() {
            return NavOutcome::Ignored;
        }
        let index = cursor.index();
        NavOutcome::Action(match self.region {
            HomeRegion::Hero => HomeAction::HeroAction(index),
            HomeRegion::Games => HomeAction::OpenGame(index),
            HomeRegion::Sidebar => HomeAction::OpenSection(index),
        })
    }

    /// Sidebar unwinds to the grid (or hero), the grid to the hero; the hero is the root
    fn cancel(&mut self) -> NavOutcome<HomeAction> {
        match self.region {
            HomeRegion::Sidebar => match self.enter(HomeRegion::Games) {
                NavOutcome::Ignored => self.enter(HomeRegion::Hero),
                moved => moved,
            },
            HomeRegion::Games => self.enter(HomeRegion::Hero),
            HomeRegion::Hero => NavOutcome::Ignored,
        }
    }

    fn toggle_sidebar(&mut self) -> NavOutcome<HomeAction> {
        if self.region == HomeRegion::Sidebar {
            self.cancel()
        } else {
            self.enter(HomeRegion::Sidebar)
        }
    }

    fn page(&mut self, pages: i32) -> NavOutcome<HomeAction> {
        if self.region != HomeRegion::Games {
            return NavOutcome::Ignored;
        }
        let delta = pages.saturating_mul(self.page_size as i32);
        Self::moved(self.games.step(delta))
    }
}

impl ScreenNav for HomeNav {
    type Action = HomeAction;

    fn apply(&mut self, input: NavInput) -> NavOutcome<HomeAction> {
        match input {
            NavInput::Direction(direction) => self.navigate(direction),
            NavInput::Confirm => self.confirm(),
            NavInput::Cancel => self.cancel(),
            NavInput::Menu => self.toggle_sidebar(),
            NavInput::TabPrev => self.page(-1),
            NavInput::TabNext => self.page(1),
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
    use crate::nav::ports::fakes::{RecordingFocus, RecordingHaptics};
    use crate::nav::ports::NavPorts;
    use crate::nav::types::{FocusHandle, HapticPattern};
    use std::time::{Duration, Instant};

    const RIGHT: NavInput = NavInput::Direction(NavDirection::Right);
    const LEFT: NavInput = NavInput::Direction(NavDirection::Left);
    const UP: NavInput = NavInput::Direction(NavDirection::Up);
    const DOWN: NavInput = NavInput::Direction(NavDirection::Down);

    fn home(hero: usize, games: usize, sidebar: usize) -> HomeNav {
        let mut nav = HomeNav::new(&NavTiming::default());
        nav.set_counts(hero, games, sidebar);
        nav
    }

    #[test]
    fn test_hero_wraps_and_drops_into_games() {
        let mut nav = home(3, 10, 4);
        assert_eq!(nav.apply(LEFT), NavOutcome::Moved);
        assert_eq!(nav.hero_index(), 2);
        assert_eq!(nav.apply(RIGHT), NavOutcome::Moved);
        assert_eq!(nav.hero_index(), 0);
        assert_eq!(nav.apply(UP), NavOutcome::Ignored);

        assert_eq!(nav.apply(DOWN), NavOutcome::Moved);
        assert_eq!(nav.region(), HomeRegion::Games);
    }

    #[test]
    fn test_games_edges() {
        let mut nav = home(3, 3, 4);
        nav.apply(DOWN);

        // Left at 0 opens the sidebar instead of wrapping
        assert_eq!(nav.apply(LEFT), NavOutcome::Moved);
        assert_eq!(nav.region(), HomeRegion::Sidebar);
        nav.apply(RIGHT);

        nav.apply(RIGHT);
        nav.apply(RIGHT);
        assert_eq!(nav.game_index(), 2);
        assert_eq!(nav.apply(RIGHT), NavOutcome::Moved);
        assert_eq!(nav.game_index(), 0);

        assert_eq!(nav.apply(DOWN), NavOutcome::Ignored);
        assert_eq!(nav.apply(UP), NavOutcome::Moved);
        assert_eq!(nav.region(), HomeRegion::Hero);
    }

    #[test]
    fn test_bumpers_page_through_games() {
        let mut nav = home(1, 20, 0).with_page_size(6);
        assert_eq!(nav.apply(NavInput::TabNext), NavOutcome::Ignored);

        nav.apply(DOWN);
        nav.apply(NavInput::TabNext);
        assert_eq!(nav.game_index(), 6);
        nav.apply(NavInput::TabNext);
        nav.apply(NavInput::TabNext);
        nav.apply(NavInput::TabNext);
        assert_eq!(nav.game_index(), 19);
        nav.apply(NavInput::TabPrev);
        assert_eq!(nav.game_index(), 13);
    }

    #[test]
    fn test_oversized_page_jumps_to_ends() {
        let mut nav = home(1, 20, 0).with_page_size(usize::MAX);
        nav.apply(DOWN);
        assert_eq!(nav.apply(NavInput::TabNext), NavOutcome::Moved);
        assert_eq!(nav.game_index(), 19);
        assert_eq!(nav.apply(NavInput::TabPrev), NavOutcome::Moved);
        assert_eq!(nav.game_index(), 0);
    }

    #[test]
    fn test_sidebar_wraps_and_confirms_section() {
        let mut nav = home(1, 5, 3);
        assert_eq!(nav.apply(NavInput::Menu), NavOutcome::Moved);
        assert!(nav.sidebar_open());
        nav.apply(UP);
        assert_eq!(nav.sidebar_index(), 2);
        assert_eq!(nav.apply(LEFT), NavOutcome::Ignored);
        assert_eq!(nav.apply(NavInput::Confirm), NavOutcome::Action(HomeAction::OpenSection(2)));

        assert_eq!(nav.apply(NavInput::Menu), NavOutcome::Moved);
        assert_eq!(nav.region(), HomeRegion::Games);
    }

    #[test]
    fn test_cancel_unwinds_to_hero_then_noop() {
        let mut nav = home(2, 5, 3);
        nav.apply(DOWN);
        nav.apply(NavInput::Menu);

        assert_eq!(nav.apply(NavInput::Cancel), NavOutcome::Moved);
        assert_eq!(nav.region(), HomeRegion::Games);
        assert_eq!(nav.apply(NavInput::Cancel), NavOutcome::Moved);
        assert_eq!(nav.region(), HomeRegion::Hero);
        assert_eq!(nav.apply(NavInput::Cancel), NavOutcome::Ignored);
    }

    #[test]
    fn test_cancel_at_root_gives_light_haptic() {
        let mut nav = home(2, 5, 3);
        let mut focus = RecordingFocus::default();
        let haptics = RecordingHaptics::default();
        let mut ports = NavPorts::new(&mut focus, &haptics);

        let outcome = nav.feed(NavInput::Cancel, Instant::now(), &mut ports);
        assert_eq!(outcome, NavOutcome::Ignored);
        assert_eq!(*haptics.pulses.borrow(), vec![HapticPattern::Bump]);
        assert!(focus.focused.is_empty());
    }

    #[test]
    fn test_moves_scroll_and_focus() {
        let mut nav = home(2, 5, 3);
        let mut focus = RecordingFocus::default();
        let haptics = RecordingHaptics::default();
        let now = Instant::now();

        {
            let mut ports = NavPorts::new(&mut focus, &haptics);
            nav.feed(DOWN, now, &mut ports);
            // Held direction inside the window is dropped
            assert_eq!(nav.feed(RIGHT, now + Duration::from_millis(50), &mut ports), NavOutcome::Debounced);
            nav.feed(RIGHT, now + Duration::from_millis(200), &mut ports);
        }

        let expected = FocusHandle { region: "home.games", index: 1 };
        assert_eq!(focus.last(), Some(expected));
        assert_eq!(focus.scrolled.last(), Some(&expected));
        assert_eq!(focus.focused.len(), 2);
    }

    #[test]
    fn test_empty_regions_fall_back() {
        let mut nav = home(1, 5, 3);
        nav.apply(NavInput::Menu);
        nav.apply(DOWN);
        nav.apply(DOWN);

        nav.set_counts(1, 5, 0);
        assert_eq!(nav.region(), HomeRegion::Games);

        nav.apply(RIGHT);
        nav.apply(RIGHT);
        nav.set_counts(1, 2, 0);
        assert_eq!(nav.game_index(), 0);

        nav.set_counts(1, 0, 0);
        assert_eq!(nav.region(), HomeRegion::Hero);
        assert_eq!(nav.apply(DOWN), NavOutcome::Ignored);
    }

    #[test]
    fn test_empty_home_focuses_nothing() {
        let mut nav = home(0, 0, 0);
        assert_eq!(nav.focused(), None);
        assert_eq!(nav.apply(NavInput::Confirm), NavOutcome::Ignored);
    }

    #[test]
    fn test_props_track_focus() {
        let mut nav = home(2, 5, 3);
        nav.apply(DOWN);
        let props = nav.props("home.games", 0);
        assert!(props.focused && props.region_active);
        let other = nav.props("home.games", 1);
        assert!(!other.focused && other.region_active);
        assert!(!nav.props("home.hero", 0).region_active);
    }
}
