//! Per-game transfer record and size estimation

use crate::constants::{GB, HANDHELD_PLATFORMS, LARGE_GENRES};
use crate::settings::{DownloadConfig, SizeBand, SizeBands};
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// A simulated transfer. Owned by the manager's active set, then by history.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadItem {
    pub id: GameId,
    pub name: String,
    pub image: Option<String>,
    pub total_bytes: u64,
    pub downloaded_bytes: u64,
    pub progress_percent: f64,
    /// Instantaneous speed, bytes/s
    pub speed: f64,
    pub eta: Eta,
    pub status: DownloadStatus,
    pub priority: Priority,
    pub start_time: DateTime<Utc>,
    /// Catalog record the download was started from, reused by retry
    #[serde(skip)]
    pub game: Game,
    #[serde(skip)]
    pub(crate) base_speed: f64,
}

/// Which size band a game falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn of(game: &Game) -> Self {
        let platform = game.platform.as_deref().unwrap_or_default().to_lowercase();
        let genre = game.genre.as_deref().unwrap_or_default().to_lowercase();

        if HANDHELD_PLATFORMS.iter().any(|p| platform.contains(p)) || genre.contains("indie") {
            Self::Small
        } else if LARGE_GENRES.iter().any(|g| genre.contains(g)) {
            Self::Large
        } else {
            Self::Medium
        }
    }

    fn band(self, bands: &SizeBands) -> SizeBand {
        match self {
            Self::Small => bands.small,
            Self::Medium => bands.medium,
            Self::Large => bands.large,
        }
    }
}

/// Draw a total size for `game` from its band.
///
/// A bad band or a non-finite draw falls back to `bands.fallback_gb`
/// instead of failing: an estimate never blocks a download.
pub fn estimate_total_bytes<R: Rng + ?Sized>(game: &Game, bands: &SizeBands, rng: &mut R) -> u64 {
    let band = SizeClass::of(game).band(bands);
    let gb = if band.is_valid() {
        rng.random_range(band.min_gb..=band.max_gb)
    } else {
        f64::NAN
    };

    let bytes = gb * GB;
    if bytes.is_finite() && bytes >= 1.0 {
        return bytes as u64;
    }

    warn!(game_id = ?game.id, min_gb = band.min_gb, max_gb = band.max_gb, "Invalid size estimate, using fallback");
    let fallback = bands.fallback_gb * GB;
    if fallback.is_finite() && fallback >= 1.0 {
        fallback as u64
    } else {
        (crate::constants::FALLBACK_SIZE_GB * GB) as u64
    }
}

/// Uniform draw in `[lo, hi]`, collapsing to `lo` for an empty range
pub(crate) fn sample_between<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo.is_finite() && hi.is_finite() && hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

/// Build a `waiting` item, or `None` when the game lacks an id or title.
pub fn create_download_item<R: Rng + ?Sized>(
    game: &Game,
    priority: Priority,
    config: &DownloadConfig,
    rng: &mut R,
) -> Option<DownloadItem> {
    let id = game.id?;
    let name = game.display_title()?.to_string();

    let total_bytes = estimate_total_bytes(game, &config.size_bands, rng);
    let base_speed = sample_between(rng, config.base_speed_min, config.base_speed_max).max(config.min_speed);

    Some(DownloadItem {
        id,
        name,
        image: game.image.clone(),
        total_bytes,
        downloaded_bytes: 0,
        progress_percent: 0.0,
        speed: 0.0,
        eta: Eta::Calculating,
        status: DownloadStatus::Waiting,
        priority,
        start_time: Utc::now(),
        game: game.clone(),
        base_speed,
    })
}

impl DownloadItem {
    pub fn remaining_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.downloaded_bytes)
    }

    pub fn is_complete(&self) -> bool {
        self.downloaded_bytes >= self.total_bytes
    }

    /// Apply one tick at `speed` bytes/s over `elapsed`, capping at the total.
    pub(crate) fn advance(&mut self, speed: f64, elapsed: Duration) {
        let step = (speed * elapsed.as_secs_f64()).max(0.0) as u64;
        self.speed = speed;
        self.downloaded_bytes = self.downloaded_bytes.saturating_add(step).min(self.total_bytes);
        self.status = if self.is_complete() {
            DownloadStatus::Completed
        } else {
            DownloadStatus::Downloading
        };
        self.refresh_derived();
    }

    pub(crate) fn refresh_derived(&mut self) {
        self.progress_percent = if self.total_bytes == 0 {
            100.0
        } else {
            (self.downloaded_bytes as f64 / self.total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        };

        self.eta = match self.status {
            DownloadStatus::Paused => Eta::Paused,
            DownloadStatus::Completed => Eta::Remaining(0),
            _ if self.speed > 0.0 => Eta::Remaining((self.remaining_bytes() as f64 / self.speed).ceil() as u64),
            _ => Eta::Calculating,
        };
    }

    pub(crate) fn pause(&mut self) {
        self.status = DownloadStatus::Paused;
        self.speed = 0.0;
        self.eta = Eta::Paused;
    }

    /// Back to `Downloading`, or to `Waiting` when no transfer slot is free
    pub(crate) fn resume(&mut self, slot_free: bool) {
        self.status = if slot_free {
            DownloadStatus::Downloading
        } else {
            DownloadStatus::Waiting
        };
        self.eta = Eta::Calculating;
    }

    pub(crate) fn stop(&mut self, status: DownloadStatus) {
        self.status = status;
        self.speed = 0.0;
        self.refresh_derived();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_rejects_games_without_id_or_title() {
        let config = DownloadConfig::default();
        let no_id = Game {
            title: Some("A".into()),
            ..Game::default()
        };
        let no_title = Game {
            id: Some(1),
            ..Game::default()
        };

        assert!(create_download_item(&no_id, Priority::Normal, &config, &mut rng()).is_none());
        assert!(create_download_item(&no_title, Priority::Normal, &config, &mut rng()).is_none());
        assert!(create_download_item(&Game::new(1, " "), Priority::Normal, &config, &mut rng()).is_none());
    }

    #[test]
    fn test_new_item_is_waiting_and_empty() {
        let item = create_download_item(&Game::new(1, "A"), Priority::High, &DownloadConfig::default(), &mut rng()).unwrap();
        assert_eq!(item.status, DownloadStatus::Waiting);
        assert_eq!(item.downloaded_bytes, 0);
        assert_eq!(item.priority, Priority::High);
        assert_eq!(item.eta, Eta::Calculating);
        assert!(item.total_bytes > 0);
    }

    #[test]
    fn test_size_classes() {
        assert_eq!(SizeClass::of(&Game::new(1, "A").with_platform("Nintendo Switch")), SizeClass::Small);
        assert_eq!(SizeClass::of(&Game::new(1, "A").with_genre("Indie")), SizeClass::Small);
        assert_eq!(SizeClass::of(&Game::new(1, "A").with_genre("Action")), SizeClass::Large);
        assert_eq!(SizeClass::of(&Game::new(1, "A").with_genre("RPG").with_platform("PC")), SizeClass::Large);
        assert_eq!(SizeClass::of(&Game::new(1, "A").with_genre("Puzzle")), SizeClass::Medium);
        assert_eq!(SizeClass::of(&Game::new(1, "A")), SizeClass::Medium);
    }

    #[test]
    fn test_estimates_stay_inside_band() {
        let bands = SizeBands::default();
        let mut rng = rng();
        let game = Game::new(1, "A").with_genre("Action");
        for _ in 0..100 {
            let bytes = estimate_total_bytes(&game, &bands, &mut rng) as f64;
            assert!(bytes >= 20.0 * GB - 1.0 && bytes <= 60.0 * GB);
        }
    }

    #[test]
    fn test_invalid_band_falls_back() {
        let mut bands = SizeBands::default();
        bands.medium = SizeBand::new(f64::NAN, 3.0);
        let bytes = estimate_total_bytes(&Game::new(1, "A"), &bands, &mut rng());
        assert_eq!(bytes, (8.0 * GB) as u64);

        bands.medium = SizeBand::new(10.0, 2.0);
        bands.fallback_gb = -1.0;
        let bytes = estimate_total_bytes(&Game::new(1, "A"), &bands, &mut rng());
        assert_eq!(bytes, (8.0 * GB) as u64);
    }

    #[test]
    fn test_advance_caps_and_completes() {
        let mut item = create_download_item(&Game::new(1, "A"), Priority::Normal, &DownloadConfig::default(), &mut rng()).unwrap();
        item.total_bytes = 1_000;

        item.advance(400.0, Duration::from_secs(1));
        assert_eq!(item.downloaded_bytes, 400);
        assert_eq!(item.status, DownloadStatus::Downloading);
        assert_eq!(item.progress_percent, 40.0);
        assert_eq!(item.eta, Eta::Remaining(2));

        item.advance(10_000.0, Duration::from_secs(1));
        assert_eq!(item.downloaded_bytes, 1_000);
        assert_eq!(item.status, DownloadStatus::Completed);
        assert_eq!(item.progress_percent, 100.0);
    }

    #[test]
    fn test_pause_sets_sentinels() {
        let mut item = create_download_item(&Game::new(1, "A"), Priority::Normal, &DownloadConfig::default(), &mut rng()).unwrap();
        item.advance(1_000.0, Duration::from_secs(1));
        item.pause();
        assert_eq!(item.speed, 0.0);
        assert_eq!(item.eta, Eta::Paused);
        assert_eq!(item.downloaded_bytes, 1_000);
    }
}
