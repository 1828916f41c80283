pub mod action;
pub mod model;
pub mod repository;
pub mod wallet;
