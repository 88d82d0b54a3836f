use std::collections::HashMap;

use crate::api::{Game, GameId};
use crate::games_repository::{GamesRepository, GamesRepositoryError};

#[derive(Default)]
struct Catalog {
    games: Vec<Game>,
    positions: HashMap<GameId, usize>,
}

#[derive(Default)]
pub struct InMemoryGamesRepository {
    catalog: parking_lot::RwLock<Catalog>,
}

impl InMemoryGamesRepository {
    pub fn with_games(games: impl IntoIterator<Item = Game>) -> Self {
        let repository = Self::default();
        {
            let mut catalog = repository.catalog.write();
            for game in games {
                catalog.upsert(game);
            }
        }
        repository
    }
}

impl Catalog {
    fn upsert(&mut self, game: Game) {
        match self.positions.get(&game.id) {
            Some(&position) => self.games[position] = game,
            None => {
                self.positions.insert(game.id.clone(), self.games.len());
                self.games.push(game);
            }
        }
    }
}

#[async_trait::async_trait]
impl GamesRepository for InMemoryGamesRepository {
    async fn upsert_game(&self, game: Game) -> Result<(), GamesRepositoryError> {
        self.catalog.write().upsert(game);
        Ok(())
    }

    async fn get_game(&self, game_id: &GameId) -> Result<Game, GamesRepositoryError> {
        let catalog = self.catalog.read();
        catalog
            .positions
            .get(game_id)
            .map(|&position| catalog.games[position].clone())
            .ok_or_else(|| GamesRepositoryError::NotFound(game_id.clone()))
    }

    async fn list_games(&self) -> Result<Vec<Game>, GamesRepositoryError> {
        Ok(self.catalog.read().games.clone())
    }
}
