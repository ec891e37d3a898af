use std::sync::Arc;
use std::time::Duration;

use crate::models::follower::FollowerHistory;
use crate::models::oauth::LoginAttempts;
use crate::models::token::TokenStore;

#[derive(Clone)]
pub struct AppConfig {
    pub client_key: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        use dotenvy::dotenv;
        use std::env;

        dotenv().ok();

        let client_key = env::var("TIKTOK_CLIENT_KEY")
            .map_err(|e| format!("TIKTOK_CLIENT_KEY not found: {}", e))?;
        let client_secret = env::var("TIKTOK_CLIENT_SECRET")
            .map_err(|e| format!("TIKTOK_CLIENT_SECRET not found: {}", e))?;
        let redirect_uri = env::var("TIKTOK_REDIRECT_URI")
            .map_err(|e| format!("TIKTOK_REDIRECT_URI not found: {}", e))?;

        Ok(Self {
            client_key,
            client_secret,
            redirect_uri,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
    pub attempts: Arc<LoginAttempts>,
    pub tokens: TokenStore,
    pub followers: FollowerHistory,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, String> {
        // A stuck upstream call should not hang a request forever.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {}", e))?;

        Ok(Self {
            config,
            http,
            attempts: Arc::new(LoginAttempts::new()),
            tokens: TokenStore::new("token.json"),
            followers: FollowerHistory::new("follower_history.json"),
        })
    }
}
