use axum::{Json, extract::State, response::IntoResponse};

use super::tiktok_client;
use crate::models::AppState;

pub async fn user_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let user_info = tiktok_client::get_user_info(&app_state.http, &app_state.tokens).await;
    Json(user_info)
}
