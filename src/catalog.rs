//! In-memory game catalog shared between the navigator and the download manager

use crate::downloads::InstallSink;
use crate::errors::CatalogError;
use crate::types::{Game, GameId};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Cheap-to-clone handle over the game list
#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    games: Arc<Mutex<Vec<Game>>>,
}

impl GameCatalog {
    pub fn from_games(games: Vec<Game>) -> Self {
        Self {
            games: Arc::new(Mutex::new(games)),
        }
    }

    /// Load a JSON array of game records
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let games: Vec<Game> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), count = games.len(), "Catalog loaded");
        Ok(Self::from_games(games))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Game>> {
        // A poisoned catalog still holds valid records
        self.games.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn games(&self) -> Vec<Game> {
        self.lock().clone()
    }

    pub fn get(&self, id: GameId) -> Option<Game> {
        self.lock().iter().find(|g| g.id == Some(id)).cloned()
    }

    /// Game at a position in catalog order, as the home screen lists them
    pub fn nth(&self, index: usize) -> Option<Game> {
        self.lock().get(index).cloned()
    }

    pub fn is_installed(&self, id: GameId) -> bool {
        self.lock().iter().any(|g| g.id == Some(id) && g.installed)
    }

    pub fn mark_installed(&self, id: GameId) {
        let mut games = self.lock();
        match games.iter_mut().find(|g| g.id == Some(id)) {
            Some(game) => {
                game.installed = true;
                debug!(game_id = id, "Marked installed");
            }
            None => warn!(game_id = id, "Install flag for unknown game"),
        }
    }
}

impl InstallSink for GameCatalog {
    fn mark_installed(&self, game_id: GameId) {
        GameCatalog::mark_installed(self, game_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_installed_updates_shared_handle() {
        let catalog = GameCatalog::from_games(vec![Game::new(1, "A"), Game::new(2, "B")]);
        let other = catalog.clone();

        other.mark_installed(2);

        assert!(catalog.is_installed(2));
        assert!(!catalog.is_installed(1));
        assert_eq!(catalog.nth(1).map(|g| g.installed), Some(true));
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let catalog = GameCatalog::from_games(vec![Game::new(1, "A")]);
        catalog.mark_installed(99);
        assert!(!catalog.is_installed(99));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_load_from_json_file() {
        let path = std::env::temp_dir().join(format!("padlaunch-catalog-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"id": 3, "title": "Hades", "genre": "Action"}, {"title": "No id"}]"#,
        )
        .unwrap();

        let catalog = GameCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(3).and_then(|g| g.genre), Some("Action".to_string()));

        std::fs::write(&path, "[{").unwrap();
        assert!(matches!(GameCatalog::load(&path), Err(CatalogError::Parse(_))));

        std::fs::remove_file(&path).ok();
    }
}
