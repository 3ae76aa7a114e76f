//! Downloads screen: filter tabs, the download list and per-row actions

use super::cursor::{settle_region, NavDebounce, RegionCursor};
use super::screen::ScreenNav;
use super::types::{NavDirection, NavInput, NavOutcome, RegionKey};
use crate::downloads::{DownloadItem, DownloadManager, InstallSink};
use crate::settings::NavTiming;
use crate::types::{DownloadStatus, GameId};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadFilter {
    #[default]
    All,
    Downloading,
    Paused,
    Completed,
    Failed,
}

impl DownloadFilter {
    pub const ALL: [DownloadFilter; 5] = [
        DownloadFilter::All,
        DownloadFilter::Downloading,
        DownloadFilter::Paused,
        DownloadFilter::Completed,
        DownloadFilter::Failed,
    ];

    pub fn matches(self, status: DownloadStatus) -> bool {
        match self {
            DownloadFilter::All => true,
            // Queued items count as in progress
            DownloadFilter::Downloading => {
                matches!(status, DownloadStatus::Downloading | DownloadStatus::Waiting)
            }
            DownloadFilter::Paused => status == DownloadStatus::Paused,
            DownloadFilter::Completed => status == DownloadStatus::Completed,
            DownloadFilter::Failed => status == DownloadStatus::Failed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DownloadFilter::All => "All",
            DownloadFilter::Downloading => "Downloading",
            DownloadFilter::Paused => "Paused",
            DownloadFilter::Completed => "Completed",
            DownloadFilter::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Pause,
    Resume,
    Cancel,
    Retry,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            RowAction::Pause => "Pause",
            RowAction::Resume => "Resume",
            RowAction::Cancel => "Cancel",
            RowAction::Retry => "Retry",
        }
    }

    /// Run against the manager. False when the download was in the wrong state.
    pub fn perform(self, manager: &DownloadManager, id: GameId, sink: Arc<dyn InstallSink>) -> bool {
        let done = match self {
            RowAction::Pause => manager.pause_download(id),
            RowAction::Resume => manager.resume_download(id, sink),
            RowAction::Cancel => manager.cancel_download(id),
            RowAction::Retry => manager.retry_download(id, sink),
        };
        debug!(game_id = id, action = self.label(), done, "Row action");
        done
    }
}

/// One visible line of the download list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRow {
    pub id: GameId,
    pub status: DownloadStatus,
    /// Lives in history rather than the active set
    pub archived: bool,
}

impl DownloadRow {
    pub fn actions(&self) -> &'static [RowAction] {
        match (self.status, self.archived) {
            (DownloadStatus::Waiting, false) => &[RowAction::Cancel],
            (DownloadStatus::Downloading, false) => &[RowAction::Pause, RowAction::Cancel],
            (DownloadStatus::Paused, false) => &[RowAction::Resume, RowAction::Cancel],
            (DownloadStatus::Failed | DownloadStatus::Cancelled, true) => &[RowAction::Retry],
            _ => &[],
        }
    }

    /// What confirming the row itself does
    pub fn toggle_action(&self) -> Option<RowAction> {
        match (self.status, self.archived) {
            (DownloadStatus::Downloading, false) => Some(RowAction::Pause),
            (DownloadStatus::Paused, false) => Some(RowAction::Resume),
            (DownloadStatus::Failed | DownloadStatus::Cancelled, true) => Some(RowAction::Retry),
            _ => None,
        }
    }
}

/// Active downloads in start order, then history most-recent-first
pub fn visible_rows(active: &[DownloadItem], history: &[DownloadItem], filter: DownloadFilter) -> Vec<DownloadRow> {
    let active = active.iter().map(|item| (item, false));
    let archived = history.iter().map(|item| (item, true));
    active
        .chain(archived)
        .filter(|(item, _)| filter.matches(item.status))
        .map(|(item, archived)| DownloadRow {
            id: item.id,
            status: item.status,
            archived,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadsRegion {
    Filters,
    Downloads,
    Actions,
}

impl DownloadsRegion {
    const CHAIN: [DownloadsRegion; 3] = [
        DownloadsRegion::Filters,
        DownloadsRegion::Downloads,
        DownloadsRegion::Actions,
    ];

    pub fn key(self) -> RegionKey {
        match self {
            DownloadsRegion::Filters => "downloads.filters",
            DownloadsRegion::Downloads => "downloads.list",
            DownloadsRegion::Actions => "downloads.actions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadsAction {
    SelectFilter(usize),
    ToggleDownload(usize),
    Invoke { download: usize, action: usize },
}

#[derive(Debug, Clone)]
pub struct DownloadsNav {
    region: DownloadsRegion,
    filters: RegionCursor,
    downloads: RegionCursor,
    actions: RegionCursor,
    active_filter: usize,
    rows: Vec<DownloadRow>,
    debounce: NavDebounce,
}

impl DownloadsNav {
    pub fn new(timing: &NavTiming) -> Self {
        Self {
            region: DownloadsRegion::Filters,
            filters: RegionCursor::new(DownloadFilter::ALL.len()),
            downloads: RegionCursor::default(),
            actions: RegionCursor::default(),
            active_filter: 0,
            rows: Vec::new(),
            debounce: NavDebounce::new(timing),
        }
    }

    pub fn region(&self) -> DownloadsRegion {
        self.region
    }

    pub fn filter_index(&self) -> usize {
        self.filters.index()
    }

    pub fn download_index(&self) -> usize {
        self.downloads.index()
    }

    pub fn action_index(&self) -> usize {
        self.actions.index()
    }

    pub fn filter(&self) -> DownloadFilter {
        DownloadFilter::ALL
            .get(self.active_filter)
            .copied()
            .unwrap_or_default()
    }

    pub fn rows(&self) -> &[DownloadRow] {
        &self.rows
    }

    pub fn focused_row(&self) -> Option<&DownloadRow> {
        self.rows.get(self.downloads.index())
    }

    /// Rebuild the list from the manager under the active filter
    pub fn sync(&mut self, manager: &DownloadManager) {
        let rows = visible_rows(&manager.active_downloads(), &manager.history(), self.filter());
        self.set_rows(rows);
    }

    pub fn set_rows(&mut self, rows: Vec<DownloadRow>) {
        self.rows = rows;
        self.downloads.set_len(self.rows.len());
        self.refresh_actions();
        self.settle();
    }

    /// Resolve a list action to the download and operation it targets
    pub fn resolve(&self, action: DownloadsAction) -> Option<(GameId, RowAction)> {
        match action {
            DownloadsAction::SelectFilter(_) => None,
            DownloadsAction::ToggleDownload(download) => {
                let row = self.rows.get(download)?;
                Some((row.id, row.toggle_action()?))
            }
            DownloadsAction::Invoke { download, action } => {
                let row = self.rows.get(download)?;
                Some((row.id, *row.actions().get(action)?))
            }
        }
    }

    fn refresh_actions(&mut self) {
        let len = self.focused_row().map_or(0, |row| row.actions().len());
        self.actions.set_len(len);
    }

    fn settle(&mut self) {
        self.region = settle_region(&DownloadsRegion::CHAIN, self.region, |r| !self.cursor(r).is_empty());
    }

    fn cursor(&self, region: DownloadsRegion) -> &RegionCursor {
        match region {
            DownloadsRegion::Filters => &self.filters,
            DownloadsRegion::Downloads => &self.downloads,
            DownloadsRegion::Actions => &self.actions,
        }
    }

    fn enter(&mut self, region: DownloadsRegion) -> NavOutcome<DownloadsAction> {
        if self.cursor(region).is_empty() {
            return NavOutcome::Ignored;
        }
        if region == DownloadsRegion::Actions {
            self.actions.reset();
        }
        self.region = region;
        NavOutcome::Moved
    }

    fn moved(changed: bool) -> NavOutcome<DownloadsAction> {
        if changed {
            NavOutcome::Moved
        } else {
            NavOutcome::Ignored
        }
    }

    fn step_downloads(&mut self, delta: i32) -> NavOutcome<DownloadsAction> {
        let changed = self.downloads.step(delta);
        if changed {
            self.refresh_actions();
        }
        Self::moved(changed)
    }

    fn select_filter(&mut self, index: usize) -> NavOutcome<DownloadsAction> {
        self.active_filter = index;
        self.downloads.reset();
        self.refresh_actions();
        NavOutcome::Action(DownloadsAction::SelectFilter(index))
    }

    fn navigate(&mut self, direction: NavDirection) -> NavOutcome<DownloadsAction> {
        match (self.region, direction) {
            (DownloadsRegion::Filters, NavDirection::Left) => Self::moved(self.filters.wrap(-1)),
            (DownloadsRegion::Filters, NavDirection::Right) => Self::moved(self.filters.wrap(1)),
            (DownloadsRegion::Filters, NavDirection::Down) => self.enter(DownloadsRegion::Downloads),
            (DownloadsRegion::Filters, NavDirection::Up) => NavOutcome::Ignored,

            (DownloadsRegion::Downloads, NavDirection::Up) if self.downloads.at_start() => {
                self.enter(DownloadsRegion::Filters)
            }
            (DownloadsRegion::Downloads, NavDirection::Up) => self.step_downloads(-1),
            (DownloadsRegion::Downloads, NavDirection::Down) => self.step_downloads(1),
            (DownloadsRegion::Downloads, NavDirection::Right) => self.enter(DownloadsRegion::Actions),
            (DownloadsRegion::Downloads, NavDirection::Left) => NavOutcome::Ignored,

            (DownloadsRegion::Actions, NavDirection::Left) if self.actions.at_start() => {
                self.enter(DownloadsRegion::Downloads)
            }
            (DownloadsRegion::Actions, NavDirection::Left) => Self::moved(self.actions.step(-1)),
            (DownloadsRegion::Actions, NavDirection::Right) => Self::moved(self.actions.wrap(1)),
            (DownloadsRegion::Actions, NavDirection::Up | NavDirection::Down) => {
                self.enter(DownloadsRegion::Downloads)
            }
        }
    }

    fn confirm(&mut self) -> NavOutcome<DownloadsAction> {
        if self.cursor(self.region).is_empty() {
            return NavOutcome::Ignored;
        }
        match self.region {
            DownloadsRegion::Filters => self.select_filter(self.filters.index()),
            DownloadsRegion::Downloads => {
                NavOutcome::Action(DownloadsAction::ToggleDownload(self.downloads.index()))
            }
            DownloadsRegion::Actions => NavOutcome::Action(DownloadsAction::Invoke {
                download: self.downloads.index(),
                action: self.actions.index(),
            }),
        }
    }

    fn cancel(&mut self) -> NavOutcome<DownloadsAction> {
        match self.region {
            DownloadsRegion::Actions => self.enter(DownloadsRegion::Downloads),
            DownloadsRegion::Downloads => self.enter(DownloadsRegion::Filters),
            DownloadsRegion::Filters => NavOutcome::Back,
        }
    }

    /// Bumpers cycle filters from anywhere; the list cursor starts over
    fn cycle_filter(&mut self, delta: i32) -> NavOutcome<DownloadsAction> {
        self.filters.wrap(delta);
        if self.region == DownloadsRegion::Actions {
            self.region = DownloadsRegion::Downloads;
        }
        self.select_filter(self.filters.index())
    }
}

impl ScreenNav for DownloadsNav {
    type Action = DownloadsAction;

    fn apply(&mut self, input: NavInput) -> NavOutcome<DownloadsAction> {
        match input {
            NavInput::Direction(direction) => self.navigate(direction),
            NavInput::Confirm => self.confirm(),
            NavInput::Cancel => self.cancel(),
            NavInput::Menu => NavOutcome::Ignored,
            NavInput::TabPrev => self.cycle_filter(-1),
            NavInput::TabNext => self.cycle_filter(1),
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
