pub mod app;
pub mod health;
pub mod meeting;
pub mod user;
