pub use in_memory_library_repository::InMemoryLibraryRepository;
pub use postgres_library_repository::PostgresLibraryRepository;

use crate::api::{GameId, OwnedGame, UserId, UserLibrary};

mod in_memory_library_repository;
mod postgres_library_repository;

#[derive(Debug, thiserror::Error)]
pub enum LibraryRepositoryError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Game {0} already in the library")]
    GameAlreadyOwned(GameId),

    #[error("Failed to deserialize library: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

/// Store of per-user game libraries, the source of all interactions
#[async_trait::async_trait]
pub trait LibraryRepository: Send + Sync {
    /// Registers user with an empty library, does nothing if user is already known
    async fn add_user(&self, user_id: &UserId) -> Result<(), LibraryRepositoryError>;

    /// Appends a game to the user library, registering the user if needed.
    /// A game can be present only once in a single library.
    async fn add_owned_game(
        &self,
        user_id: &UserId,
        owned_game: OwnedGame,
    ) -> Result<(), LibraryRepositoryError>;

    /// Replaces the whole library of a user, used by bulk imports
    async fn put_library(&self, library: UserLibrary) -> Result<(), LibraryRepositoryError>;

    async fn get_library(&self, user_id: &UserId) -> Result<UserLibrary, LibraryRepositoryError>;

    /// Lists libraries of all known users in registration order, including empty ones
    async fn list_libraries(&self) -> Result<Vec<UserLibrary>, LibraryRepositoryError>;
}
