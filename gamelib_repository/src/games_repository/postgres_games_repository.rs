use serde_json::json;
use tokio_postgres::{Client, Statement};

use crate::api::{Game, GameId};
use crate::games_repository::{GamesRepository, GamesRepositoryError};
use crate::postgres::{connect, PostgresConfig};

pub struct PostgresGamesRepository {
    client: Client,
}

impl PostgresGamesRepository {
    pub async fn init(config: &PostgresConfig) -> anyhow::Result<Self> {
        let client = connect(
            config,
            "
        CREATE TABLE IF NOT EXISTS games (
            seq             SERIAL,
            id              TEXT PRIMARY KEY,
            params          JSONB NOT NULL
            )
        ",
        )
        .await?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl GamesRepository for PostgresGamesRepository {
    async fn upsert_game(&self, game: Game) -> Result<(), GamesRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO games (id, params) VALUES ($1, $2)
                 ON CONFLICT (id) DO UPDATE SET params = EXCLUDED.params",
            )
            .await?;

        self.client
            .execute(&stmt, &[&game.id, &json!(game)])
            .await?;
        Ok(())
    }

    async fn get_game(&self, game_id: &GameId) -> Result<Game, GamesRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM games WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[game_id]).await?;

        let params: serde_json::Value = rows
            .first()
            .ok_or_else(|| GamesRepositoryError::NotFound(game_id.clone()))?
            .try_get(0)?;

        Ok(serde_json::from_value(params)?)
    }

    async fn list_games(&self) -> Result<Vec<Game>, GamesRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM games ORDER BY seq")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;

        rows.iter()
            .map(|row| -> Result<Game, GamesRepositoryError> {
                let params: serde_json::Value = row.try_get(0)?;
                Ok(serde_json::from_value(params)?)
            })
            .collect()
    }
}

#[cfg(test)]
mod postgres_games_repository_tests {
    use serde_json::json;
    use serial_test::file_serial;
    use testcontainers::{ContainerAsync, GenericImage};

    use crate::api::Game;
    use crate::games_repository::{GamesRepository, GamesRepositoryError, PostgresGamesRepository};
    use crate::postgres::test_support::start_postgres_container;

    async fn start_postgres_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, PostgresGamesRepository) {
        let (container, config) = start_postgres_container().await;
        for _ in 0..10 {
            if let Ok(repo) = PostgresGamesRepository::init(&config).await {
                return (container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Tests upsert, get and ordered listing against a real database
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_upsert_get_and_list_games() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        let not_found = repo.get_game(&"G1".to_string()).await;
        assert!(matches!(not_found, Err(GamesRepositoryError::NotFound(..))));

        let g1 = Game {
            id: "G1".to_string(),
            label: "First".to_string(),
            details: json!({"genre": ["RPG", "Action"], "Developer": "Acme"})
                .as_object()
                .cloned()
                .unwrap(),
        };
        let g2 = Game {
            id: "G2".to_string(),
            label: "Second".to_string(),
            details: Default::default(),
        };
        repo.upsert_game(g1.clone()).await.expect("Failed to add game");
        repo.upsert_game(g2.clone()).await.expect("Failed to add game");

        assert_eq!(repo.get_game(&"G1".to_string()).await.unwrap(), g1);

        let renamed = Game {
            label: "First, remastered".to_string(),
            ..g1.clone()
        };
        repo.upsert_game(renamed.clone()).await.unwrap();

        let listed = repo.list_games().await.expect("Failed to list games");
        assert_eq!(listed, vec![renamed, g2]);
    }
}
