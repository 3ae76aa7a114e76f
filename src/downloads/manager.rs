//! Download manager: owns the active set and history, drives one tick task per transfer

use super::item::{create_download_item, sample_between, DownloadItem};
use crate::constants::EVENT_CAPACITY;
use crate::errors::StartError;
use crate::settings::DownloadConfig;
use crate::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Receives "game is installed" once per successful completion
pub trait InstallSink: Send + Sync {
    fn mark_installed(&self, game_id: GameId);
}

impl<F> InstallSink for F
where
    F: Fn(GameId) + Send + Sync,
{
    fn mark_installed(&self, game_id: GameId) {
        self(game_id)
    }
}

/// Mutable state behind the manager's lock
#[derive(Default)]
struct DownloadState {
    downloads: HashMap<GameId, DownloadItem>,
    download_order: Vec<GameId>, // Preserve start order for display
    history: VecDeque<DownloadItem>, // Most recent first
    transfers: HashMap<GameId, CancellationToken>,
    stopped: bool,
}

impl DownloadState {
    /// Take an item out of the active set
    fn detach(&mut self, id: GameId) -> Option<DownloadItem> {
        let item = self.downloads.remove(&id)?;
        self.download_order.retain(|&other| other != id);
        if let Some(token) = self.transfers.remove(&id) {
            token.cancel();
        }
        Some(item)
    }

    fn downloading_count(&self) -> usize {
        self.downloads
            .values()
            .filter(|d| d.status == DownloadStatus::Downloading)
            .count()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct DownloadManager {
    state: Arc<Mutex<DownloadState>>,
    config: Arc<DownloadConfig>,
    rng: Arc<Mutex<StdRng>>,
    events: broadcast::Sender<DownloadEvent>,
    shutdown: CancellationToken,
    runtime: Handle,
}

impl DownloadManager {
    pub fn new(config: DownloadConfig, runtime: Handle) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::random());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        debug!(seed, tick_ms = config.tick_ms, grace_ms = config.grace_ms, "Download manager created");

        Self {
            state: Arc::new(Mutex::new(DownloadState::default())),
            config: Arc::new(config),
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            events,
            shutdown: CancellationToken::new(),
            runtime,
        }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Subscribe to state change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<DownloadEvent> {
        self.events.subscribe()
    }

    /// Start a simulated transfer for `game`.
    ///
    /// Fails for a record without id/title, for a game that already has an
    /// active download, and after `stop()`. Nothing is created on failure.
    pub fn start_download(
        &self,
        game: &Game,
        priority: Priority,
        sink: Arc<dyn InstallSink>,
    ) -> Result<(), StartError> {
        let mut state = lock(&self.state);
        self.start_locked(&mut state, game, priority, sink)
    }

    fn start_locked(
        &self,
        state: &mut DownloadState,
        game: &Game,
        priority: Priority,
        sink: Arc<dyn InstallSink>,
    ) -> Result<(), StartError> {
        if state.stopped {
            return Err(StartError::ShutDown);
        }

        let Some(id) = game.id else {
            warn!(title = ?game.title, "Refusing download for game without id");
            return Err(StartError::InvalidGame);
        };
        if state.downloads.contains_key(&id) {
            debug!(game_id = id, "Download already active");
            return Err(StartError::AlreadyActive(id));
        }

        let item = {
            let mut rng = lock(&self.rng);
            create_download_item(game, priority, &self.config, &mut *rng)
        };
        let Some(item) = item else {
            warn!(game_id = id, "Refusing download for game without title");
            return Err(StartError::InvalidGame);
        };

        info!(
            game_id = id,
            name = %item.name,
            total_bytes = item.total_bytes,
            priority = ?priority,
            "Starting download"
        );

        state.downloads.insert(id, item);
        state.download_order.push(id);
        self.spawn_transfer(state, id, sink);
        self.events.send(DownloadEvent::Started(id)).ok();
        Ok(())
    }

    /// Run the tick loop for `id` from its stored byte offset
    fn spawn_transfer(&self, state: &mut DownloadState, id: GameId, sink: Arc<dyn InstallSink>) {
        let token = self.shutdown.child_token();
        if let Some(previous) = state.transfers.insert(id, token.clone()) {
            previous.cancel();
        }

        let transfer = Transfer {
            id,
            state: self.state.clone(),
            config: self.config.clone(),
            rng: self.rng.clone(),
            events: self.events.clone(),
            token,
            sink,
        };
        self.runtime.spawn(transfer.run());
    }

    /// Pause a downloading item. Any other status is a no-op.
    pub fn pause_download(&self, id: GameId) -> bool {
        let mut state = lock(&self.state);
        match state.downloads.get_mut(&id) {
            Some(item) if item.status == DownloadStatus::Downloading => {
                item.pause();
                info!(game_id = id, downloaded = item.downloaded_bytes, "Download paused");
                self.events.send(DownloadEvent::Paused(id)).ok();
                true
            }
            _ => false,
        }
    }

    /// Resume a paused item from where it stopped. Any other status is a no-op.
    /// With `max_concurrent` reached the item is queued as `Waiting` instead.
    ///
    /// `sink` is only used if the item's tick task is no longer running.
    pub fn resume_download(&self, id: GameId, sink: Arc<dyn InstallSink>) -> bool {
        let mut state = lock(&self.state);
        let slot_free = self
            .config
            .max_concurrent
            .map_or(true, |cap| state.downloading_count() < cap);
        match state.downloads.get_mut(&id) {
            Some(item) if item.status == DownloadStatus::Paused => {
                item.resume(slot_free);
                info!(
                    game_id = id,
                    downloaded = item.downloaded_bytes,
                    queued = !slot_free,
                    "Download resumed"
                );
            }
            _ => return false,
        }

        let running = state.transfers.get(&id).is_some_and(|t| !t.is_cancelled());
        if !running && !state.stopped {
            debug!(game_id = id, "Restarting tick loop on resume");
            self.spawn_transfer(&mut state, id, sink);
        }
        self.events.send(DownloadEvent::Resumed(id)).ok();
        true
    }

    /// Stop an active transfer and move it straight into history.
    ///
    /// Completed items waiting out their grace delay are left alone.
    pub fn cancel_download(&self, id: GameId) -> bool {
        let mut state = lock(&self.state);
        match state.downloads.get(&id) {
            Some(item) if item.status != DownloadStatus::Completed => {}
            _ => return false,
        }

        let Some(mut item) = state.detach(id) else {
            return false;
        };
        item.stop(DownloadStatus::Cancelled);
        info!(game_id = id, downloaded = item.downloaded_bytes, "Download cancelled");
        state.history.push_front(item);
        self.events.send(DownloadEvent::Cancelled(id)).ok();
        true
    }

    /// Restart a history entry at high priority.
    ///
    /// No-op when the id is not in history or the game is active again.
    pub fn retry_download(&self, id: GameId, sink: Arc<dyn InstallSink>) -> bool {
        let mut state = lock(&self.state);
        if state.downloads.contains_key(&id) {
            return false;
        }
        let Some(pos) = state.history.iter().position(|d| d.id == id) else {
            return false;
        };
        let Some(previous) = state.history.remove(pos) else {
            return false;
        };

        match self.start_locked(&mut state, &previous.game, Priority::High, sink) {
            Ok(()) => {
                info!(game_id = id, "Download retried");
                self.events.send(DownloadEvent::Retried(id)).ok();
                true
            }
            Err(e) => {
                warn!(game_id = id, error = %e, "Retry failed, keeping history entry");
                state.history.insert(pos, previous);
                false
            }
        }
    }

    /// Counts over the active set, computed on every call
    pub fn get_download_stats(&self) -> DownloadStats {
        let state = lock(&self.state);
        let mut stats = DownloadStats {
            total: state.downloads.len(),
            ..DownloadStats::default()
        };
        for item in state.downloads.values() {
            match item.status {
                DownloadStatus::Waiting => stats.waiting += 1,
                DownloadStatus::Downloading => {
                    stats.downloading += 1;
                    stats.total_speed += item.speed;
                }
                DownloadStatus::Paused => stats.paused += 1,
                DownloadStatus::Completed => stats.completed += 1,
                DownloadStatus::Failed => stats.failed += 1,
                DownloadStatus::Cancelled => {}
            }
        }
        stats
    }

    /// Snapshot of active downloads in start order
    pub fn active_downloads(&self) -> Vec<DownloadItem> {
        let state = lock(&self.state);
        state
            .download_order
            .iter()
            .filter_map(|id| state.downloads.get(id).cloned())
            .collect()
    }

    /// Snapshot of history, most recent first
    pub fn history(&self) -> Vec<DownloadItem> {
        lock(&self.state).history.iter().cloned().collect()
    }

    pub fn get(&self, id: GameId) -> Option<DownloadItem> {
        lock(&self.state).downloads.get(&id).cloned()
    }

    pub fn is_active(&self, id: GameId) -> bool {
        lock(&self.state).downloads.contains_key(&id)
    }

    pub fn clear_history(&self) {
        let mut state = lock(&self.state);
        debug!(count = state.history.len(), "Clearing download history");
        state.history.clear();
    }

    /// Cancel every tick task and refuse new starts. Safe to call repeatedly.
    pub fn stop(&self) {
        let mut state = lock(&self.state);
        if state.stopped {
            return;
        }
        state.stopped = true;
        state.transfers.clear();
        self.shutdown.cancel();
        info!(active = state.downloads.len(), "Download manager stopped");
    }
}

impl Drop for DownloadManager {
    fn drop(&mut self) {
        self.stop();
    }
}

enum TickOutcome {
    Continue,
    Stop,
    Finished(DownloadStatus),
}

/// Everything a tick task needs, detached from the manager
struct Transfer {
    id: GameId,
    state: Arc<Mutex<DownloadState>>,
    config: Arc<DownloadConfig>,
    rng: Arc<Mutex<StdRng>>,
    events: broadcast::Sender<DownloadEvent>,
    token: CancellationToken,
    sink: Arc<dyn InstallSink>,
}

impl Transfer {
    async fn run(self) {
        let period = self.config.tick();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let finished = loop {
            tokio::select! {
                _ = self.token.cancelled() => return,
                _ = ticker.tick() => {}
            }
            match self.tick(period) {
                TickOutcome::Continue => continue,
                TickOutcome::Stop => return,
                TickOutcome::Finished(status) => break status,
            }
        };

        if finished == DownloadStatus::Completed {
            self.notify_installed();
        }

        tokio::select! {
            _ = self.token.cancelled() => return,
            _ = tokio::time::sleep(self.config.grace()) => {}
        }
        self.archive(finished);
    }

    fn tick(&self, period: std::time::Duration) -> TickOutcome {
        let mut state = lock(&self.state);
        // Cancelled under the same lock: no tick may touch a replaced or removed item
        if self.token.is_cancelled() {
            return TickOutcome::Stop;
        }

        let at_capacity = self
            .config
            .max_concurrent
            .is_some_and(|cap| state.downloading_count() >= cap);

        let Some(item) = state.downloads.get_mut(&self.id) else {
            debug!(game_id = self.id, "Tick for removed download, stopping");
            return TickOutcome::Stop;
        };

        match item.status {
            DownloadStatus::Paused => return TickOutcome::Continue,
            DownloadStatus::Waiting if at_capacity => return TickOutcome::Continue,
            DownloadStatus::Waiting | DownloadStatus::Downloading => {}
            DownloadStatus::Cancelled | DownloadStatus::Completed | DownloadStatus::Failed => {
                return TickOutcome::Stop;
            }
        }

        let mut rng = lock(&self.rng);
        let failure_rate = self.config.failure_rate.clamp(0.0, 1.0);
        if failure_rate > 0.0 && rng.random_bool(failure_rate) {
            item.stop(DownloadStatus::Failed);
            warn!(game_id = self.id, downloaded = item.downloaded_bytes, "Simulated download failure");
            self.events.send(DownloadEvent::Failed(self.id)).ok();
            return TickOutcome::Finished(DownloadStatus::Failed);
        }

        let jitter = self.config.jitter.abs();
        let factor = sample_between(&mut *rng, 1.0 - jitter, 1.0 + jitter);
        let speed = (item.base_speed * factor).max(self.config.min_speed).max(1.0);
        item.advance(speed, period);

        self.events
            .send(DownloadEvent::Progress {
                game_id: self.id,
                downloaded_bytes: item.downloaded_bytes,
                total_bytes: item.total_bytes,
            })
            .ok();

        if item.status == DownloadStatus::Completed {
            info!(game_id = self.id, total_bytes = item.total_bytes, "Download completed");
            self.events.send(DownloadEvent::Completed(self.id)).ok();
            TickOutcome::Finished(DownloadStatus::Completed)
        } else {
            TickOutcome::Continue
        }
    }

    fn notify_installed(&self) {
        let sink = self.sink.clone();
        let id = self.id;
        if std::panic::catch_unwind(AssertUnwindSafe(|| sink.mark_installed(id))).is_err() {
            error!(game_id = id, "Install callback panicked");
        }
    }

    /// Move a finished item into history once its grace delay is over
    fn archive(&self, finished: DownloadStatus) {
        let mut state = lock(&self.state);
        if self.token.is_cancelled() {
            return;
        }
        let still_finished = state
            .downloads
            .get(&self.id)
            .is_some_and(|d| d.status == finished);
        if !still_finished {
            return;
        }

        if let Some(item) = state.detach(self.id) {
            debug!(game_id = self.id, status = ?item.status, "Archived to history");
            state.history.push_front(item);
            self.events.send(DownloadEvent::Archived(self.id)).ok();
        }
    }
}
