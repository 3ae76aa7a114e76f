//! Error types surfaced at the crate boundary

use crate::types::GameId;
use thiserror::Error;

/// Why `DownloadManager::start_download` refused a game
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("game record is missing an id or title")]
    InvalidGame,
    #[error("game {0} already has an active download")]
    AlreadyActive(GameId),
    #[error("download manager has been stopped")]
    ShutDown,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
