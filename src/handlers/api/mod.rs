pub mod data_handler;
pub mod tiktok_client;
pub mod user_handler;
pub mod videos_handler;

pub use data_handler::data_handler;
pub use user_handler::user_handler;
pub use videos_handler::videos_handler;
