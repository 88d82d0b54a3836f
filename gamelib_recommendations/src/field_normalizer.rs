use std::collections::HashMap;

use serde_json::Value;

use gamelib_repository::api::{Game, GameDetails, GameId};

pub const GENRE_ALIASES: [&str; 2] = ["genere", "genre"];
pub const DEVELOPER_ALIASES: [&str; 2] = ["developer", "sviluppatore"];
/// Label used in place of a genre or developer that could not be found
pub const UNKNOWN: &str = "unknown";

/// Typed view of a single attribute bag entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<'a> {
    Absent,
    Single(&'a str),
    Multi(Vec<&'a str>),
}

impl<'a> Field<'a> {
    /// Anything that is not a non-empty string or a list with at least one non-empty string is `Absent`
    fn from_value(value: &'a Value) -> Self {
        match value {
            Value::String(single) if !single.trim().is_empty() => Field::Single(single),
            Value::Array(items) => {
                let values: Vec<&str> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|item| !item.trim().is_empty())
                    .collect();
                if values.is_empty() {
                    Field::Absent
                } else {
                    Field::Multi(values)
                }
            }
            _ => Field::Absent,
        }
    }

    fn lowercase_values(&self) -> Vec<String> {
        match self {
            Field::Absent => vec![],
            Field::Single(value) => vec![value.to_lowercase()],
            Field::Multi(values) => values.iter().map(|v| v.to_lowercase()).collect(),
        }
    }
}

/// Finds the first key of `details` whose lowercase form is one of `aliases`
pub fn find_field<'a>(details: &'a GameDetails, aliases: &[&str]) -> Field<'a> {
    details
        .iter()
        .find(|(key, _)| aliases.contains(&key.to_lowercase().as_str()))
        .map(|(_, value)| Field::from_value(value))
        .unwrap_or(Field::Absent)
}

/// Comma joined lowercase genres
pub fn normalized_genre(details: &GameDetails) -> Option<String> {
    let genres = find_field(details, &GENRE_ALIASES).lowercase_values();
    (!genres.is_empty()).then(|| genres.join(", "))
}

/// Lowercase developer, only the first one is taken when several are listed
pub fn normalized_developer(details: &GameDetails) -> Option<String> {
    find_field(details, &DEVELOPER_ALIASES)
        .lowercase_values()
        .into_iter()
        .next()
}

/// Content features of a single game, the only input of content based affinity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentProfile {
    pub genres: Vec<String>,
    pub developer: Option<String>,
}

impl ContentProfile {
    pub fn from_details(details: &GameDetails) -> Self {
        Self {
            genres: find_field(details, &GENRE_ALIASES).lowercase_values(),
            developer: normalized_developer(details),
        }
    }

    pub fn genre_label(&self) -> String {
        if self.genres.is_empty() {
            UNKNOWN.to_string()
        } else {
            self.genres.join(", ")
        }
    }

    pub fn developer_label(&self) -> &str {
        self.developer.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Content profiles of the whole catalog, built once per run
#[derive(Debug, Default)]
pub struct ContentFeatureTable {
    profiles: HashMap<GameId, ContentProfile>,
}

impl ContentFeatureTable {
    pub fn from_catalog(catalog: &[Game]) -> Self {
        let profiles = catalog
            .iter()
            .map(|game| (game.id.clone(), ContentProfile::from_details(&game.details)))
            .collect();
        Self { profiles }
    }

    pub fn get(&self, game_id: &GameId) -> Option<&ContentProfile> {
        self.profiles.get(game_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod field_normalizer_tests {
    use serde_json::json;

    use super::*;

    fn details(value: Value) -> GameDetails {
        value.as_object().cloned().expect("details must be an object")
    }

    #[test]
    fn test_find_field_ignores_key_case() {
        let details = details(json!({"Genere": "RPG", "DEVELOPER": ["Acme", "Other"]}));

        assert_eq!(find_field(&details, &GENRE_ALIASES), Field::Single("RPG"));
        assert_eq!(
            find_field(&details, &DEVELOPER_ALIASES),
            Field::Multi(vec!["Acme", "Other"])
        );
        assert_eq!(find_field(&details, &["publisher"]), Field::Absent);
    }

    #[test]
    fn test_genre_and_developer_normalization() {
        let multi = details(json!({"genre": ["RPG", "Open World"], "sviluppatore": ["Acme", "B"]}));
        assert_eq!(
            normalized_genre(&multi),
            Some("rpg, open world".to_string())
        );
        assert_eq!(normalized_developer(&multi), Some("acme".to_string()));

        let single = details(json!({"GENRE": "FPS", "Developer": "Id Software"}));
        assert_eq!(normalized_genre(&single), Some("fps".to_string()));
        assert_eq!(normalized_developer(&single), Some("id software".to_string()));
    }

    #[test]
    fn test_odd_shaped_fields_are_absent() {
        let odd = details(json!({"genre": 12, "developer": [null, 3], "platform": "PC"}));
        assert_eq!(normalized_genre(&odd), None);
        assert_eq!(normalized_developer(&odd), None);

        let profile = ContentProfile::from_details(&odd);
        assert_eq!(profile.genre_label(), UNKNOWN);
        assert_eq!(profile.developer_label(), UNKNOWN);

        let empty = details(json!({"genre": "", "developer": []}));
        assert_eq!(ContentProfile::from_details(&empty), ContentProfile::default());
    }

    #[test]
    fn test_mixed_list_keeps_string_entries() {
        let mixed = details(json!({"genre": ["Puzzle", 7, "", "Indie"]}));
        assert_eq!(normalized_genre(&mixed), Some("puzzle, indie".to_string()));
    }

    #[test]
    fn test_feature_table_agrees_with_normalizer() {
        let catalog = vec![
            Game {
                id: "G1".to_string(),
                label: "One".to_string(),
                details: details(json!({"genre": ["RPG", "Action"], "developer": "Acme"})),
            },
            Game {
                id: "G2".to_string(),
                label: "Two".to_string(),
                details: Default::default(),
            },
        ];
        let table = ContentFeatureTable::from_catalog(&catalog);
        assert_eq!(table.len(), 2);

        let g1 = table.get(&"G1".to_string()).unwrap();
        assert_eq!(Some(g1.genre_label()), normalized_genre(&catalog[0].details));
        assert_eq!(g1.developer, normalized_developer(&catalog[0].details));
        assert_eq!(g1.genres, vec!["rpg".to_string(), "action".to_string()]);

        let g2 = table.get(&"G2".to_string()).unwrap();
        assert_eq!(g2.genre_label(), UNKNOWN);
        assert!(table.get(&"G3".to_string()).is_none());
    }
}
