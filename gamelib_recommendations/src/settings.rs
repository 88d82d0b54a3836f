use anyhow::Context;
use config::{Config, Environment};
use serde::Deserialize;

use gamelib_repository::postgres::PostgresConfig;

const ENV_PREFIX: &str = "GAMELIB";

/// Tuning of a single recommendation run
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommenderSettings {
    /// Length of the ranked list
    pub top_n: usize,
    /// Floor added for non positive similarities and never reached candidates
    pub epsilon: f64,
    /// Accepted and carried through, not applied as a filter
    pub similarity_threshold: f64,
    /// Maximum size of the list of content affine games nobody played yet, never above 20
    pub novel_affine_limit: usize,
    /// Fixes the shuffle of the content affine list, random when not set
    pub shuffle_seed: Option<u64>,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            top_n: 40,
            epsilon: 0.01,
            similarity_threshold: 0.1,
            novel_affine_limit: 20,
            shuffle_seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub use_in_memory_db: bool,
    pub db_host: String,
    pub db_username: String,
    pub db_password: String,
    /// Keep serving stored recommendations over HTTP after the batch run
    pub serve_api: bool,
    pub port: u16,
    pub recommender: RecommenderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_in_memory_db: false,
            db_host: "127.0.0.1".to_string(),
            db_username: "postgres".to_string(),
            db_password: "postgres".to_string(),
            serve_api: true,
            port: 8080,
            recommender: RecommenderSettings::default(),
        }
    }
}

impl Settings {
    /// Reads `GAMELIB_*` environment variables, nested sections are separated with `__`
    /// e.g. `GAMELIB_RECOMMENDER__TOP_N=20`
    pub fn load() -> anyhow::Result<Self> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(
                environment
                    .prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn postgres_config(&self) -> PostgresConfig {
        PostgresConfig {
            hostname: self.db_host.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }
}
