use std::collections::HashMap;

use crate::api::{OwnedGame, UserId, UserLibrary};
use crate::library_repository::{LibraryRepository, LibraryRepositoryError};

#[derive(Default)]
struct Libraries {
    libraries: Vec<UserLibrary>,
    positions: HashMap<UserId, usize>,
}

impl Libraries {
    fn entry(&mut self, user_id: &UserId) -> &mut UserLibrary {
        let position = match self.positions.get(user_id) {
            Some(&position) => position,
            None => {
                self.positions.insert(user_id.clone(), self.libraries.len());
                self.libraries.push(UserLibrary {
                    user_id: user_id.clone(),
                    games: vec![],
                });
                self.libraries.len() - 1
            }
        };
        &mut self.libraries[position]
    }
}

#[derive(Default)]
pub struct InMemoryLibraryRepository {
    libraries: parking_lot::RwLock<Libraries>,
}

impl InMemoryLibraryRepository {
    pub fn with_libraries(libraries: impl IntoIterator<Item = UserLibrary>) -> Self {
        let repository = Self::default();
        {
            let mut locked = repository.libraries.write();
            for library in libraries {
                let games = library.games;
                locked.entry(&library.user_id).games = games;
            }
        }
        repository
    }
}

#[async_trait::async_trait]
impl LibraryRepository for InMemoryLibraryRepository {
    async fn add_user(&self, user_id: &UserId) -> Result<(), LibraryRepositoryError> {
        self.libraries.write().entry(user_id);
        Ok(())
    }

    async fn add_owned_game(
        &self,
        user_id: &UserId,
        owned_game: OwnedGame,
    ) -> Result<(), LibraryRepositoryError> {
        let mut locked = self.libraries.write();
        let library = locked.entry(user_id);
        if library
            .games
            .iter()
            .any(|g| g.game_id == owned_game.game_id)
        {
            return Err(LibraryRepositoryError::GameAlreadyOwned(owned_game.game_id));
        }
        library.games.push(owned_game);
        Ok(())
    }

    async fn put_library(&self, library: UserLibrary) -> Result<(), LibraryRepositoryError> {
        self.libraries.write().entry(&library.user_id).games = library.games;
        Ok(())
    }

    async fn get_library(&self, user_id: &UserId) -> Result<UserLibrary, LibraryRepositoryError> {
        let locked = self.libraries.read();
        locked
            .positions
            .get(user_id)
            .map(|&position| locked.libraries[position].clone())
            .ok_or_else(|| LibraryRepositoryError::UserNotFound(user_id.clone()))
    }

    async fn list_libraries(&self) -> Result<Vec<UserLibrary>, LibraryRepositoryError> {
        Ok(self.libraries.read().libraries.clone())
    }
}
