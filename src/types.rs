//! Common types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a game. A download shares its game's id.
pub type GameId = u64;

/// Game record as supplied by the catalog provider.
///
/// Only `id` and `title` are required to start a download; the rest is
/// display metadata the core passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    pub id: Option<GameId>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    #[serde(alias = "background_image")]
    pub image: Option<String>,
    pub genre: Option<String>,
    pub platform: Option<String>,
    pub installed: bool,
}

impl Game {
    pub fn new(id: GameId, title: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Title if present and not blank
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Download priority. Metadata only; retries are always issued at `High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Status of an individual download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Waiting,
    Downloading,
    Paused,
    Completed,
    Cancelled,
    Failed,
}

impl DownloadStatus {
    /// Completed, cancelled and failed transfers never tick again
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Downloading => "Downloading",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }
}

/// Estimated time remaining for a transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eta {
    /// No speed sample yet
    #[default]
    Calculating,
    Paused,
    /// Whole seconds remaining
    Remaining(u64),
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eta::Calculating => f.write_str("Calculating..."),
            Eta::Paused => f.write_str("Paused"),
            Eta::Remaining(secs) if *secs < 60 => write!(f, "{}s", secs),
            Eta::Remaining(secs) => write!(f, "{}m {}s", secs / 60, secs % 60),
        }
    }
}

/// Aggregate counts over the active download set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DownloadStats {
    pub waiting: usize,
    pub downloading: usize,
    pub paused: usize,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// Sum of current speeds across downloading items, bytes/s
    pub total_speed: f64,
}

/// Notifications published by the download manager
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Started(GameId),
    Progress {
        game_id: GameId,
        downloaded_bytes: u64,
        total_bytes: u64,
    },
    Paused(GameId),
    Resumed(GameId),
    Completed(GameId),
    Failed(GameId),
    Cancelled(GameId),
    /// Moved from the active set into history after its grace delay
    Archived(GameId),
    Retried(GameId),
}

impl DownloadEvent {
    pub fn game_id(&self) -> GameId {
        match self {
            DownloadEvent::Started(id)
            | DownloadEvent::Paused(id)
            | DownloadEvent::Resumed(id)
            | DownloadEvent::Completed(id)
            | DownloadEvent::Failed(id)
            | DownloadEvent::Cancelled(id)
            | DownloadEvent::Archived(id)
            | DownloadEvent::Retried(id) => *id,
            DownloadEvent::Progress { game_id, .. } => *game_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eta_formatting() {
        assert_eq!(Eta::Remaining(42).to_string(), "42s");
        assert_eq!(Eta::Remaining(60).to_string(), "1m 0s");
        assert_eq!(Eta::Remaining(125).to_string(), "2m 5s");
        assert_eq!(Eta::Paused.to_string(), "Paused");
    }

    #[test]
    fn test_game_deserializes_partial_records() {
        let game: Game = serde_json::from_str(r#"{"id": 7, "name": "Celeste"}"#).unwrap();
        assert_eq!(game.id, Some(7));
        assert_eq!(game.display_title(), Some("Celeste"));
        assert!(!game.installed);

        let blank: Game = serde_json::from_str(r#"{"id": 8, "title": "   "}"#).unwrap();
        assert_eq!(blank.display_title(), None);
    }

    #[test]
    fn test_event_game_id() {
        assert_eq!(DownloadEvent::Retried(4).game_id(), 4);
        let progress = DownloadEvent::Progress {
            game_id: 9,
            downloaded_bytes: 1,
            total_bytes: 2,
        };
        assert_eq!(progress.game_id(), 9);
    }

    #[test]
    fn test_builder_sets_image() {
        let game = Game::new(1, "A").with_image("covers/a.png");
        assert_eq!(game.image.as_deref(), Some("covers/a.png"));
    }

    #[test]
    fn test_finished_statuses() {
        assert!(DownloadStatus::Completed.is_finished());
        assert!(DownloadStatus::Failed.is_finished());
        assert!(!DownloadStatus::Paused.is_finished());
        assert!(!DownloadStatus::Waiting.is_finished());
    }
}
