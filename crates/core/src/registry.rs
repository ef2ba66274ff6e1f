//! Running games by identifier, each behind its own lock.

use std::{collections::HashMap, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::info;

use crate::{
    config::GameConfig,
    game::{GameSnapshot, GameState, SetupError},
};

/// Reasons a game cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The identifier is taken.
    #[error("a game with id {0:?} already exists")]
    AlreadyExists(String),
    /// The game itself could not be created.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Shared handle to one running game.
///
/// Mutations go through [`GameHandle::write`], which holds the game's exclusive lock for
/// the whole operation; any number of readers may share [`GameHandle::read`].
#[derive(Debug, Clone)]
pub struct GameHandle {
    inner: Arc<RwLock<GameState>>,
}

impl GameHandle {
    fn new(game: GameState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(game)),
        }
    }

    /// Shared access for queries.
    pub fn read(&self) -> RwLockReadGuard<'_, GameState> {
        self.inner.read()
    }

    /// Exclusive access for one mutating operation.
    pub fn write(&self) -> RwLockWriteGuard<'_, GameState> {
        self.inner.write()
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.inner.read().snapshot()
    }
}

/// Running games by identifier.
///
/// The map lock is only held to look a game up; each game has its own lock, so operations
/// on different games never wait for each other.
pub struct GameRegistry {
    config: GameConfig,
    games: RwLock<HashMap<String, GameHandle>>,
}

impl GameRegistry {
    /// Empty registry creating games with `config`.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            games: RwLock::new(HashMap::new()),
        }
    }

    /// Configuration new games are created with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a game under `id`.
    pub fn create<S: AsRef<str>>(
        &self,
        id: impl Into<String>,
        players: &[S],
    ) -> Result<GameHandle, RegistryError> {
        let id = id.into();
        if self.games.read().contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }
        let game = GameState::new(players, &self.config)?;

        let mut games = self.games.write();
        if games.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }
        let handle = GameHandle::new(game);
        games.insert(id.clone(), handle.clone());
        info!(game = %id, players = players.len(), "registered game");
        Ok(handle)
    }

    /// Handle to the game registered under `id`.
    pub fn get(&self, id: &str) -> Option<GameHandle> {
        self.games.read().get(id).cloned()
    }

    /// Forget the game under `id`. Outstanding handles keep working.
    pub fn remove(&self, id: &str) -> Option<GameHandle> {
        let removed = self.games.write().remove(id);
        if removed.is_some() {
            info!(game = %id, "removed game");
        }
        removed
    }

    /// Identifiers of every registered game, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.games.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
