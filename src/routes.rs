pub mod error;
pub mod game;
pub mod health;
pub mod review;
pub mod user;
