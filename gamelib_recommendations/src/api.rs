use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

use gamelib_repository::api::{GameId, UserId};

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Recommendations of a single user, contains only game ids that are not in the user library
pub struct Recommendations {
    /// Ranked list, collaborative for users with a library and most owned games otherwise
    #[serde(rename = "raccomandati")]
    pub recommended: Vec<GameId>,
    /// Unordered, up to 20 games that nobody owns yet and share a genre or developer
    /// with the user library
    #[serde(rename = "nuovi_simili")]
    pub novel_affine: Vec<GameId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct RecommendationRecord {
    pub user_id: UserId,
    pub recommendations: Recommendations,
}
