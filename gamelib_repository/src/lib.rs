pub mod api;
pub mod games_repository;
pub mod library_repository;
pub mod postgres;
