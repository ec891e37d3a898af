use axum::{Json, extract::State, response::IntoResponse};

use super::tiktok_client;
use crate::models::AppState;

pub async fn videos_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let videos = tiktok_client::get_video_list(&app_state.http, &app_state.tokens, 0, 20).await;
    Json(videos)
}
