/// Database configuration and connection management
pub mod database;

/// Business profile, numbering and export settings from config.toml
pub mod app;

pub use app::{AppConfig, load_app_config};
