use serde::{Deserialize, Serialize};

pub type GameId = String;
pub type UserId = String;

/// Free-form attribute bag of a game as delivered by catalog ingestion.
/// Keys are not normalized and values are usually a string or a list of strings,
/// but any JSON value is tolerated here.
pub type GameDetails = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    #[serde(alias = "_id")]
    pub id: GameId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub details: GameDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct AchievementState {
    pub name: String,
    #[serde(default)]
    pub achieved: bool,
}

/// Single entry of a user library, one per game the user added
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct OwnedGame {
    pub game_id: GameId,
    #[serde(default)]
    pub achievements: Vec<AchievementState>,
}

impl OwnedGame {
    pub fn new(game_id: impl Into<GameId>) -> Self {
        Self {
            game_id: game_id.into(),
            achievements: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct UserLibrary {
    pub user_id: UserId,
    #[serde(default)]
    pub games: Vec<OwnedGame>,
}
