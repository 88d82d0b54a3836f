use serde_json::json;
use tokio_postgres::{Client, Row, Statement};

use crate::api::{OwnedGame, UserId, UserLibrary};
use crate::library_repository::{LibraryRepository, LibraryRepositoryError};
use crate::postgres::{connect, PostgresConfig};

pub struct PostgresLibraryRepository {
    client: Client,
}

impl PostgresLibraryRepository {
    pub async fn init(config: &PostgresConfig) -> anyhow::Result<Self> {
        let client = connect(
            config,
            "
        CREATE TABLE IF NOT EXISTS user_games (
            seq             SERIAL,
            user_id         TEXT PRIMARY KEY,
            games           JSONB NOT NULL DEFAULT '[]'::JSONB
            )
        ",
        )
        .await?;
        Ok(Self { client })
    }
}

fn library_from_row(row: &Row) -> Result<UserLibrary, LibraryRepositoryError> {
    let user_id: UserId = row.try_get(0)?;
    let games: serde_json::Value = row.try_get(1)?;
    Ok(UserLibrary {
        user_id,
        games: serde_json::from_value(games)?,
    })
}

#[async_trait::async_trait]
impl LibraryRepository for PostgresLibraryRepository {
    async fn add_user(&self, user_id: &UserId) -> Result<(), LibraryRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO user_games (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .await?;
        self.client.execute(&stmt, &[user_id]).await?;
        Ok(())
    }

    async fn add_owned_game(
        &self,
        user_id: &UserId,
        owned_game: OwnedGame,
    ) -> Result<(), LibraryRepositoryError> {
        self.add_user(user_id).await?;

        let stmt: Statement = self
            .client
            .prepare(
                "UPDATE user_games SET games = games || ($2)::JSONB
                 WHERE user_id = ($1) AND NOT games @> ($3)::JSONB
                 RETURNING user_id",
            )
            .await?;

        let rows = self
            .client
            .query(
                &stmt,
                &[
                    user_id,
                    &json!([owned_game]),
                    &json!([{ "game_id": owned_game.game_id }]),
                ],
            )
            .await?;

        if rows.is_empty() {
            Err(LibraryRepositoryError::GameAlreadyOwned(owned_game.game_id))
        } else {
            Ok(())
        }
    }

    async fn put_library(&self, library: UserLibrary) -> Result<(), LibraryRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO user_games (user_id, games) VALUES ($1, $2)
                 ON CONFLICT (user_id) DO UPDATE SET games = EXCLUDED.games",
            )
            .await?;
        self.client
            .execute(&stmt, &[&library.user_id, &json!(library.games)])
            .await?;
        Ok(())
    }

    async fn get_library(&self, user_id: &UserId) -> Result<UserLibrary, LibraryRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT user_id, games FROM user_games WHERE user_id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[user_id]).await?;
        let row = rows
            .first()
            .ok_or_else(|| LibraryRepositoryError::UserNotFound(user_id.clone()))?;
        library_from_row(row)
    }

    async fn list_libraries(&self) -> Result<Vec<UserLibrary>, LibraryRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT user_id, games FROM user_games ORDER BY seq")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(library_from_row).collect()
    }
}

#[cfg(test)]
mod tests_postgres_library_repository {
    use serial_test::file_serial;
    use testcontainers::{ContainerAsync, GenericImage};

    use super::*;
    use crate::postgres::test_support::start_postgres_container;

    async fn start_postgres_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, PostgresLibraryRepository) {
        let (container, config) = start_postgres_container().await;
        for _ in 0..10 {
            if let Ok(repo) = PostgresLibraryRepository::init(&config).await {
                return (container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Same scenario as for the in memory repository, against a real database
    async fn test_library_management() {
        let (_container, repository) = start_postgres_container_and_init_repo().await;
        assert_eq!(repository.list_libraries().await.unwrap(), vec![]);

        let empty_user = "U0".to_string();
        let player = "U1".to_string();

        repository.add_user(&empty_user).await.unwrap();
        repository
            .add_owned_game(&player, OwnedGame::new("G1"))
            .await
            .unwrap();
        repository
            .add_owned_game(&player, OwnedGame::new("G2"))
            .await
            .unwrap();

        let duplicate = repository
            .add_owned_game(&player, OwnedGame::new("G1"))
            .await;
        assert!(matches!(
            duplicate,
            Err(LibraryRepositoryError::GameAlreadyOwned(..))
        ));

        assert_eq!(
            repository.list_libraries().await.unwrap(),
            vec![
                UserLibrary {
                    user_id: empty_user,
                    games: vec![],
                },
                UserLibrary {
                    user_id: player.clone(),
                    games: vec![OwnedGame::new("G1"), OwnedGame::new("G2")],
                },
            ]
        );

        repository
            .put_library(UserLibrary {
                user_id: player.clone(),
                games: vec![OwnedGame::new("G3")],
            })
            .await
            .unwrap();
        assert_eq!(
            repository.get_library(&player).await.unwrap().games,
            vec![OwnedGame::new("G3")]
        );
    }
}
