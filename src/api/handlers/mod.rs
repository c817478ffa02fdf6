// src/api/handlers/mod.rs
mod health;
mod info;
mod predict;

pub use health::health_check;
pub use info::model_info;
pub use predict::predict;
