pub mod api;
pub mod app_config;
pub mod batch_exporter;
pub mod field_normalizer;
mod handlers;
pub mod interaction_matrix;
pub mod recommendations;
pub mod recommendations_repository;
pub mod settings;
pub mod similarity;
