pub mod meeting;
pub mod user;
pub mod view;
