use std::collections::{BTreeMap, HashMap};

use gamelib_repository::api::{GameId, UserId, UserLibrary};

/// A single (user, game) pair, one per entry of a user library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub user_id: UserId,
    pub game_id: GameId,
}

/// Flattens libraries into one interaction per owned game entry
pub fn flatten_libraries(libraries: &[UserLibrary]) -> Vec<Interaction> {
    libraries
        .iter()
        .flat_map(|library| {
            library.games.iter().map(|owned| Interaction {
                user_id: library.user_id.clone(),
                game_id: owned.game_id.clone(),
            })
        })
        .collect()
}

/// Maps identifiers to dense indexes in first encounter order
#[derive(Debug, Default, Clone)]
pub struct IdIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl IdIndex {
    fn index_or_insert(&mut self, id: &str) -> usize {
        if let Some(&position) = self.positions.get(id) {
            return position;
        }
        self.positions.insert(id.to_string(), self.ids.len());
        self.ids.push(id.to_string());
        self.ids.len() - 1
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for IdIndex {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut index = IdIndex::default();
        for id in iter {
            index.index_or_insert(id.as_ref());
        }
        index
    }
}

/// Sparse row of the matrix, user index to value
pub type SparseRow = BTreeMap<usize, f64>;

/// Game x user interaction counts together with their row normalized form.
/// Both index sets are derived from the interactions only.
#[derive(Debug, Default)]
pub struct InteractionMatrix {
    games: IdIndex,
    users: IdIndex,
    counts: Vec<SparseRow>,
    normalized: Vec<SparseRow>,
}

impl InteractionMatrix {
    pub fn build(interactions: &[Interaction]) -> Self {
        let mut games = IdIndex::default();
        let mut users = IdIndex::default();
        let mut counts: Vec<SparseRow> = vec![];

        for interaction in interactions {
            let game = games.index_or_insert(&interaction.game_id);
            let user = users.index_or_insert(&interaction.user_id);
            if game == counts.len() {
                counts.push(SparseRow::new());
            }
            *counts[game].entry(user).or_default() += 1.0;
        }

        let normalized = counts.iter().map(normalize_row).collect();

        Self {
            games,
            users,
            counts,
            normalized,
        }
    }

    pub fn games(&self) -> &IdIndex {
        &self.games
    }

    pub fn users(&self) -> &IdIndex {
        &self.users
    }

    pub fn counts(&self, game: usize) -> &SparseRow {
        &self.counts[game]
    }

    pub fn normalized_rows(&self) -> &[SparseRow] {
        &self.normalized
    }

    /// Raw number of interactions of the game across all users
    pub fn total_count(&self, game: usize) -> f64 {
        self.counts[game].values().sum()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}

/// Scales the row to unit L2 norm, a zero row stays zero
fn normalize_row(row: &SparseRow) -> SparseRow {
    let norm = row.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm == 0.0 {
        return row.clone();
    }
    row.iter().map(|(&user, &value)| (user, value / norm)).collect()
}
