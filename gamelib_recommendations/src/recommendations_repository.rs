pub use in_memory_recommendations_repository::InMemoryRecommendationsRepository;
pub use postgres_recommendations_repository::PostgresRecommendationsRepository;

use gamelib_repository::api::UserId;

use crate::api::{RecommendationRecord, Recommendations};

mod in_memory_recommendations_repository;
mod postgres_recommendations_repository;

#[derive(Debug, thiserror::Error)]
pub enum RecommendationsRepositoryError {
    #[error("No recommendations for user {0}")]
    NotFound(UserId),

    #[error("Failed to deserialize recommendations: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait RecommendationsRepository: Send + Sync {
    /// Atomically drops every stored record and stores `records` instead,
    /// users missing from `records` end up without recommendations
    async fn replace_all(
        &self,
        records: Vec<RecommendationRecord>,
    ) -> Result<(), RecommendationsRepositoryError>;

    async fn get_recommendations(
        &self,
        user_id: &UserId,
    ) -> Result<Recommendations, RecommendationsRepositoryError>;

    async fn count(&self) -> Result<usize, RecommendationsRepositoryError>;
}
