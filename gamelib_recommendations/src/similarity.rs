use itertools::Itertools;

use crate::interaction_matrix::{IdIndex, InteractionMatrix, SparseRow};

/// Dense, symmetric item-item cosine similarity
#[derive(Debug, Default)]
pub struct SimilarityMatrix {
    games: IdIndex,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn compute(matrix: &InteractionMatrix) -> Self {
        Self::from_rows(matrix.games().clone(), matrix.normalized_rows())
    }

    /// Cosine similarity of every pair of rows.
    /// Dot products are accumulated through an inverted user -> games index,
    /// so only pairs of games sharing at least one user are ever touched.
    /// A zero row has similarity 0 to everything, itself included.
    pub fn from_rows(games: IdIndex, rows: &[SparseRow]) -> Self {
        let size = rows.len();
        let mut values = vec![0.0; size * size];

        let norms: Vec<f64> = rows
            .iter()
            .map(|row| row.values().map(|v| v * v).sum::<f64>().sqrt())
            .collect();

        let mut user_columns: Vec<Vec<(usize, f64)>> = vec![];
        for (game, row) in rows.iter().enumerate() {
            for (&user, &value) in row.iter().filter(|(_, v)| **v != 0.0) {
                if user >= user_columns.len() {
                    user_columns.resize_with(user + 1, Vec::new);
                }
                user_columns[user].push((game, value));
            }
        }

        // Games are pushed in ascending order so every pair comes as (lower, higher)
        for column in user_columns.iter() {
            for (&(a, value_a), &(b, value_b)) in column.iter().tuple_combinations() {
                values[a * size + b] += value_a * value_b;
            }
        }

        for a in 0..size {
            if norms[a] == 0.0 {
                continue;
            }
            values[a * size + a] = 1.0;
            for b in (a + 1)..size {
                let cosine = if norms[b] == 0.0 {
                    0.0
                } else {
                    (values[a * size + b] / (norms[a] * norms[b])).clamp(-1.0, 1.0)
                };
                values[a * size + b] = cosine;
                values[b * size + a] = cosine;
            }
        }

        Self { games, values }
    }

    pub fn games(&self) -> &IdIndex {
        &self.games
    }

    pub fn size(&self) -> usize {
        self.games.len()
    }

    /// Similarities of game `a` to every game, indexed like `games()`
    pub fn row(&self, a: usize) -> &[f64] {
        let size = self.size();
        &self.values[a * size..(a + 1) * size]
    }

    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.values[a * self.size() + b]
    }

    /// Similarity by game ids, games without any interaction are similar to nothing
    pub fn between(&self, a: &str, b: &str) -> f64 {
        match (self.games.index_of(a), self.games.index_of(b)) {
            (Some(a), Some(b)) => self.get(a, b),
            _ => 0.0,
        }
    }
}
