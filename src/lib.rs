// src/lib.rs
pub mod api;
pub mod banner;
pub mod checker;
pub mod config;
pub mod errors;
pub mod inference;
pub mod model;
pub mod models;
pub mod parser;
pub mod prompt;
