use std::collections::HashMap;

use gamelib_repository::api::UserId;

use crate::api::{RecommendationRecord, Recommendations};
use crate::recommendations_repository::{
    RecommendationsRepository, RecommendationsRepositoryError,
};

#[derive(Default)]
pub struct InMemoryRecommendationsRepository {
    user_to_recommendations: parking_lot::RwLock<HashMap<UserId, Recommendations>>,
}

#[async_trait::async_trait]
impl RecommendationsRepository for InMemoryRecommendationsRepository {
    async fn replace_all(
        &self,
        records: Vec<RecommendationRecord>,
    ) -> Result<(), RecommendationsRepositoryError> {
        let replacement: HashMap<UserId, Recommendations> = records
            .into_iter()
            .map(|record| (record.user_id, record.recommendations))
            .collect();
        *self.user_to_recommendations.write() = replacement;
        Ok(())
    }

    async fn get_recommendations(
        &self,
        user_id: &UserId,
    ) -> Result<Recommendations, RecommendationsRepositoryError> {
        self.user_to_recommendations
            .read()
            .get(user_id)
            .cloned()
            .ok_or_else(|| RecommendationsRepositoryError::NotFound(user_id.clone()))
    }

    async fn count(&self) -> Result<usize, RecommendationsRepositoryError> {
        Ok(self.user_to_recommendations.read().len())
    }
}

#[cfg(test)]
mod tests_in_memory_recommendations_repository {
    use super::*;

    fn record(user_id: &str, recommended: &[&str]) -> RecommendationRecord {
        RecommendationRecord {
            user_id: user_id.to_string(),
            recommendations: Recommendations {
                recommended: recommended.iter().map(|g| g.to_string()).collect(),
                novel_affine: vec![],
            },
        }
    }

    #[tokio::test]
    /// 1. Missing user is not found
    /// 2. First replace stores every record
    /// 3. Second replace drops users that are no longer present
    async fn test_replace_all_overwrites_previous_set() {
        let repository = InMemoryRecommendationsRepository::default();
        let u1 = "U1".to_string();
        let u2 = "U2".to_string();

        assert!(matches!(
            repository.get_recommendations(&u1).await,
            Err(RecommendationsRepositoryError::NotFound(..))
        ));

        repository
            .replace_all(vec![record("U1", &["G1"]), record("U2", &["G2"])])
            .await
            .unwrap();
        assert_eq!(repository.count().await.unwrap(), 2);
        assert_eq!(
            repository.get_recommendations(&u1).await.unwrap().recommended,
            vec!["G1"]
        );

        repository
            .replace_all(vec![record("U1", &["G3"])])
            .await
            .unwrap();
        assert_eq!(repository.count().await.unwrap(), 1);
        assert_eq!(
            repository.get_recommendations(&u1).await.unwrap().recommended,
            vec!["G3"]
        );
        assert!(matches!(
            repository.get_recommendations(&u2).await,
            Err(RecommendationsRepositoryError::NotFound(..))
        ));
    }
}
