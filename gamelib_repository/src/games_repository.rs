pub use in_memory_games_repository::InMemoryGamesRepository;
pub use postgres_games_repository::PostgresGamesRepository;

use crate::api::{Game, GameId};

mod in_memory_games_repository;
mod postgres_games_repository;

#[derive(thiserror::Error, Debug)]
pub enum GamesRepositoryError {
    #[error("Game {0} not found")]
    NotFound(GameId),

    #[error("Failed to deserialize game: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

/// Game catalog store
#[async_trait::async_trait]
pub trait GamesRepository: Send + Sync {
    /// Inserts the game or replaces the stored document with the same id
    async fn upsert_game(&self, game: Game) -> Result<(), GamesRepositoryError>;
    /// Retrieves a single game from the catalog
    async fn get_game(&self, game_id: &GameId) -> Result<Game, GamesRepositoryError>;
    /// Lists the whole catalog in insertion order
    async fn list_games(&self) -> Result<Vec<Game>, GamesRepositoryError>;
}
