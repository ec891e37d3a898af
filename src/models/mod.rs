pub mod app_config;
pub mod follower;
pub mod oauth;
pub mod token;

pub use app_config::{AppConfig, AppState};
