use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use gamelib_repository::api::{Game, GameId, UserId, UserLibrary};

use crate::api::Recommendations;
use crate::field_normalizer::{ContentFeatureTable, ContentProfile};
use crate::interaction_matrix::{flatten_libraries, InteractionMatrix};
use crate::settings::RecommenderSettings;
use crate::similarity::SimilarityMatrix;

/// Upper bound of the novel list, `novel_affine_limit` can only lower it
pub const MAX_NOVEL_AFFINE: usize = 20;

/// Immutable snapshot of a single run together with everything derived from it.
/// Built once, read by every per user computation.
pub struct RecommendationContext {
    catalog: Vec<Game>,
    known_users: Vec<UserId>,
    owned_games: HashMap<UserId, Vec<GameId>>,
    matrix: InteractionMatrix,
    similarity: SimilarityMatrix,
    content: ContentFeatureTable,
    popularity_ranking: Vec<GameId>,
    never_played: Vec<GameId>,
}

impl RecommendationContext {
    pub fn build(catalog: Vec<Game>, libraries: Vec<UserLibrary>) -> Self {
        // Users with empty libraries are known too, the roster does not come from the matrix
        let known_users = libraries
            .iter()
            .map(|library| library.user_id.clone())
            .unique()
            .collect_vec();

        let mut owned_games: HashMap<UserId, Vec<GameId>> = Default::default();
        for library in libraries.iter() {
            owned_games
                .entry(library.user_id.clone())
                .or_default()
                .extend(library.games.iter().map(|g| g.game_id.clone()));
        }
        for games in owned_games.values_mut() {
            *games = std::mem::take(games).into_iter().unique().collect();
        }

        let matrix = InteractionMatrix::build(&flatten_libraries(&libraries));
        let similarity = SimilarityMatrix::compute(&matrix);
        let content = ContentFeatureTable::from_catalog(&catalog);

        let catalog_positions: HashMap<&str, usize> = catalog
            .iter()
            .enumerate()
            .map(|(position, game)| (game.id.as_str(), position))
            .collect();

        // Ties keep catalog order, games unknown to the catalog go after it in encounter order
        let popularity_ranking = (0..matrix.game_count())
            .sorted_by_key(|&game| {
                let id = matrix.games().id(game);
                let position = catalog_positions
                    .get(id)
                    .copied()
                    .unwrap_or(catalog.len() + game);
                (Reverse(matrix.total_count(game) as u64), position)
            })
            .map(|game| matrix.games().id(game).to_string())
            .collect_vec();

        let never_played = catalog
            .iter()
            .filter(|game| matrix.games().index_of(&game.id).is_none())
            .map(|game| game.id.clone())
            .unique()
            .collect_vec();

        Self {
            catalog,
            known_users,
            owned_games,
            matrix,
            similarity,
            content,
            popularity_ranking,
            never_played,
        }
    }

    pub fn known_users(&self) -> &[UserId] {
        &self.known_users
    }

    pub fn catalog(&self) -> &[Game] {
        &self.catalog
    }

    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Games ordered by number of interactions, most owned first
    pub fn popularity_ranking(&self) -> &[GameId] {
        &self.popularity_ranking
    }

    /// Catalog games without a single interaction, in catalog order
    pub fn never_played(&self) -> &[GameId] {
        &self.never_played
    }

    /// Unique games of the user library, empty for unknown users
    pub fn owned_games(&self, user_id: &str) -> &[GameId] {
        self.owned_games
            .get(user_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Genres and developers found in a user library
#[derive(Debug, Default)]
struct UserTaste<'a> {
    genres: HashSet<&'a str>,
    developers: HashSet<&'a str>,
}

impl<'a> UserTaste<'a> {
    fn from_profiles(profiles: impl Iterator<Item = &'a ContentProfile>) -> Self {
        let mut taste = UserTaste::default();
        for profile in profiles {
            taste.genres.extend(profile.genres.iter().map(String::as_str));
            taste.developers.extend(profile.developer.as_deref());
        }
        taste
    }

    fn is_affine(&self, profile: &ContentProfile) -> bool {
        profile
            .genres
            .iter()
            .any(|genre| self.genres.contains(genre.as_str()))
            || profile
                .developer
                .as_deref()
                .is_some_and(|developer| self.developers.contains(developer))
    }
}

pub struct RecommendationsEngine {
    settings: RecommenderSettings,
    rng: StdRng,
}

impl RecommendationsEngine {
    pub fn new(settings: RecommenderSettings) -> Self {
        let rng = match settings.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { settings, rng }
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    /// Never fails, unknown users and users without games get the most owned games
    pub fn recommend_for_user(
        &mut self,
        context: &RecommendationContext,
        user_id: &str,
    ) -> Recommendations {
        let owned = context.owned_games(user_id);

        let recommended = if owned.is_empty() {
            self.most_owned(context)
        } else {
            self.collaborative(context, owned)
        };
        let novel_affine = self.novel_affine(context, owned);

        tracing::debug!(
            "Recommendations for user {}: {} ranked, {} novel",
            user_id,
            recommended.len(),
            novel_affine.len()
        );

        Recommendations {
            recommended,
            novel_affine,
        }
    }

    fn most_owned(&self, context: &RecommendationContext) -> Vec<GameId> {
        context
            .popularity_ranking()
            .iter()
            .take(self.settings.top_n)
            .cloned()
            .collect()
    }

    /// Sums similarity rows of the owned games over every not owned game.
    /// Non positive similarities still add `epsilon` so no candidate ends up at zero.
    fn collaborative(&self, context: &RecommendationContext, owned: &[GameId]) -> Vec<GameId> {
        let similarity = context.similarity();
        let epsilon = self.settings.epsilon;

        let owned_indexes: Vec<usize> = owned
            .iter()
            .filter_map(|game_id| similarity.games().index_of(game_id))
            .collect();
        if owned_indexes.is_empty() {
            return self.most_owned(context);
        }
        let owned_set: HashSet<usize> = owned_indexes.iter().copied().collect();

        let mut scores = vec![0.0_f64; similarity.size()];
        for &game in owned_indexes.iter() {
            for (candidate, &score) in similarity.row(game).iter().enumerate() {
                if owned_set.contains(&candidate) {
                    continue;
                }
                scores[candidate] += if score > 0.0 { score } else { epsilon };
            }
        }
        for (candidate, score) in scores.iter_mut().enumerate() {
            if !owned_set.contains(&candidate) && *score == 0.0 {
                *score += epsilon;
            }
        }

        (0..similarity.size())
            .filter(|candidate| !owned_set.contains(candidate))
            .sorted_by(|a, b| scores[*b].total_cmp(&scores[*a]))
            .take(self.settings.top_n)
            .map(|candidate| similarity.games().id(candidate).to_string())
            .collect()
    }

    /// Never played games sharing a genre or the developer with the user library, shuffled
    fn novel_affine(&mut self, context: &RecommendationContext, owned: &[GameId]) -> Vec<GameId> {
        let taste = UserTaste::from_profiles(owned.iter().filter_map(|g| context.content.get(g)));

        let mut affine = context
            .never_played()
            .iter()
            .filter(|game_id| {
                context
                    .content
                    .get(game_id)
                    .is_some_and(|profile| taste.is_affine(profile))
            })
            .cloned()
            .collect_vec();

        affine.shuffle(&mut self.rng);
        affine.truncate(self.settings.novel_affine_limit.min(MAX_NOVEL_AFFINE));
        affine
    }
}
