pub mod game;
pub mod postgres_repository;
pub mod review;
pub mod user;
