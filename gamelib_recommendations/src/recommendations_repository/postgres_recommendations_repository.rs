use serde_json::json;
use tokio::sync::Mutex;
use tokio_postgres::{Client, Statement};

use gamelib_repository::api::UserId;
use gamelib_repository::postgres::{connect, PostgresConfig};

use crate::api::{RecommendationRecord, Recommendations};
use crate::recommendations_repository::{
    RecommendationsRepository, RecommendationsRepositoryError,
};

const SCHEMA: &str = "
        CREATE TABLE IF NOT EXISTS recommendations (
            user_id             TEXT PRIMARY KEY,
            recommendations     JSONB NOT NULL
            )
        ";

/// Writes go through their own connection, so reads see the last committed
/// set and never wait for a running `replace_all`
pub struct PostgresRecommendationsRepository {
    // Transactions need exclusive access to the client
    writer: Mutex<Client>,
    reader: Client,
}

impl PostgresRecommendationsRepository {
    pub async fn init(config: &PostgresConfig) -> anyhow::Result<Self> {
        let writer = connect(config, SCHEMA).await?;
        let reader = connect(config, SCHEMA).await?;
        Ok(Self {
            writer: Mutex::new(writer),
            reader,
        })
    }
}

#[async_trait::async_trait]
impl RecommendationsRepository for PostgresRecommendationsRepository {
    async fn replace_all(
        &self,
        records: Vec<RecommendationRecord>,
    ) -> Result<(), RecommendationsRepositoryError> {
        let mut client = self.writer.lock().await;
        let transaction = client.transaction().await?;

        transaction
            .execute("DELETE FROM recommendations", &[])
            .await?;

        let stmt: Statement = transaction
            .prepare("INSERT INTO recommendations (user_id, recommendations) VALUES ($1, $2)")
            .await?;
        for record in records.iter() {
            transaction
                .execute(&stmt, &[&record.user_id, &json!(record.recommendations)])
                .await?;
        }

        transaction.commit().await?;
        Ok(())
    }

    async fn get_recommendations(
        &self,
        user_id: &UserId,
    ) -> Result<Recommendations, RecommendationsRepositoryError> {
        let stmt: Statement = self
            .reader
            .prepare("SELECT recommendations FROM recommendations WHERE user_id = ($1)")
            .await?;

        let rows = self.reader.query(&stmt, &[user_id]).await?;

        let recommendations: serde_json::Value = rows
            .first()
            .ok_or_else(|| RecommendationsRepositoryError::NotFound(user_id.clone()))?
            .try_get(0)?;

        Ok(serde_json::from_value(recommendations)?)
    }

    async fn count(&self) -> Result<usize, RecommendationsRepositoryError> {
        let row = self
            .reader
            .query_one("SELECT COUNT(*) FROM recommendations", &[])
            .await?;
        let count: i64 = row.try_get(0)?;
        usize::try_from(count).map_err(|e| RecommendationsRepositoryError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests_postgres_recommendations_repository {
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use super::*;

    async fn start_postgres_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, PostgresRecommendationsRepository) {
        let pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        let config = PostgresConfig {
            hostname: "127.0.0.1".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
        };
        for _ in 0..10 {
            if let Ok(repo) = PostgresRecommendationsRepository::init(&config).await {
                return (pg_container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Second replace_all must leave only the records of the second run
    async fn test_replace_all_overwrites_previous_set() {
        let (_container, repository) = start_postgres_container_and_init_repo().await;
        let u1 = "U1".to_string();

        let first = Recommendations {
            recommended: vec!["G1".to_string(), "G2".to_string()],
            novel_affine: vec!["G9".to_string()],
        };
        repository
            .replace_all(vec![
                RecommendationRecord {
                    user_id: u1.clone(),
                    recommendations: first.clone(),
                },
                RecommendationRecord {
                    user_id: "U2".to_string(),
                    recommendations: Recommendations::default(),
                },
            ])
            .await
            .expect("Failed to store recommendations");
        assert_eq!(repository.count().await.unwrap(), 2);
        assert_eq!(repository.get_recommendations(&u1).await.unwrap(), first);

        let second = Recommendations {
            recommended: vec!["G3".to_string()],
            novel_affine: vec![],
        };
        repository
            .replace_all(vec![RecommendationRecord {
                user_id: u1.clone(),
                recommendations: second.clone(),
            }])
            .await
            .expect("Failed to store recommendations");

        assert_eq!(repository.count().await.unwrap(), 1);
        assert_eq!(repository.get_recommendations(&u1).await.unwrap(), second);
        assert!(matches!(
            repository.get_recommendations(&"U2".to_string()).await,
            Err(RecommendationsRepositoryError::NotFound(..))
        ));
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    async fn test_reads_do_not_wait_for_writer() {
        let (_container, repository) = start_postgres_container_and_init_repo().await;
        let u1 = "U1".to_string();
        let stored = Recommendations {
            recommended: vec!["G1".to_string()],
            novel_affine: vec![],
        };
        repository
            .replace_all(vec![RecommendationRecord {
                user_id: u1.clone(),
                recommendations: stored.clone(),
            }])
            .await
            .expect("Failed to store recommendations");

        let _writer = repository.writer.lock().await;
        let read = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            repository.get_recommendations(&u1),
        )
        .await
        .expect("Read blocked by the writer");
        assert_eq!(read.unwrap(), stored);
        let count = tokio::time::timeout(std::time::Duration::from_secs(5), repository.count())
            .await
            .expect("Count blocked by the writer");
        assert_eq!(count.unwrap(), 1);
    }
}
