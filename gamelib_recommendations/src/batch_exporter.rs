use std::sync::Arc;

use anyhow::Context;

use gamelib_repository::games_repository::GamesRepository;
use gamelib_repository::library_repository::LibraryRepository;

use crate::api::RecommendationRecord;
use crate::recommendations::{RecommendationContext, RecommendationsEngine};
use crate::recommendations_repository::RecommendationsRepository;
use crate::settings::RecommenderSettings;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub users: usize,
    pub warm_users: usize,
    pub cold_users: usize,
    pub catalog_size: usize,
    pub never_played: usize,
}

/// Recomputes recommendations of every known user and replaces the stored set
pub struct BatchExporter {
    games_repository: Arc<dyn GamesRepository>,
    library_repository: Arc<dyn LibraryRepository>,
    recommendations_repository: Arc<dyn RecommendationsRepository>,
    settings: RecommenderSettings,
}

impl BatchExporter {
    pub fn new(
        games_repository: Arc<dyn GamesRepository>,
        library_repository: Arc<dyn LibraryRepository>,
        recommendations_repository: Arc<dyn RecommendationsRepository>,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            games_repository,
            library_repository,
            recommendations_repository,
            settings,
        }
    }

    /// Takes the snapshot of the run, any failure here aborts before anything is written
    pub async fn load_context(&self) -> anyhow::Result<RecommendationContext> {
        let catalog = self
            .games_repository
            .list_games()
            .await
            .context("Failed to load game catalog")?;
        let libraries = self
            .library_repository
            .list_libraries()
            .await
            .context("Failed to load user libraries")?;

        tracing::info!(
            "Loaded {} games and {} user libraries",
            catalog.len(),
            libraries.len()
        );
        Ok(RecommendationContext::build(catalog, libraries))
    }

    pub fn compute(
        context: &RecommendationContext,
        engine: &mut RecommendationsEngine,
    ) -> (Vec<RecommendationRecord>, BatchSummary) {
        let mut summary = BatchSummary {
            catalog_size: context.catalog().len(),
            never_played: context.never_played().len(),
            ..BatchSummary::default()
        };

        let records = context
            .known_users()
            .iter()
            .map(|user_id| {
                if context.owned_games(user_id).is_empty() {
                    summary.cold_users += 1;
                } else {
                    summary.warm_users += 1;
                }
                RecommendationRecord {
                    user_id: user_id.clone(),
                    recommendations: engine.recommend_for_user(context, user_id),
                }
            })
            .collect::<Vec<_>>();

        summary.users = records.len();
        (records, summary)
    }

    pub async fn run(&self) -> anyhow::Result<BatchSummary> {
        let context = self.load_context().await?;
        let mut engine = RecommendationsEngine::new(self.settings.clone());

        let (records, summary) = Self::compute(&context, &mut engine);

        self.recommendations_repository
            .replace_all(records)
            .await
            .context("Failed to store recommendations")?;

        tracing::info!(
            "Stored recommendations for {} users ({} warm, {} cold), {} of {} games never played",
            summary.users,
            summary.warm_users,
            summary.cold_users,
            summary.never_played,
            summary.catalog_size
        );
        Ok(summary)
    }
}
