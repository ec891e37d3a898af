use axum::{Json, extract::State, response::IntoResponse};
use serde_json::{Value, json};
use time::OffsetDateTime;

use super::tiktok_client;
use crate::models::AppState;

/// Combined dashboard payload: profile, videos, and follower growth.
/// Polling this endpoint is what feeds the follower history.
pub async fn data_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let user_info = tiktok_client::get_user_info(&app_state.http, &app_state.tokens).await;
    let videos = tiktok_client::get_video_list(&app_state.http, &app_state.tokens, 0, 20).await;

    let mut follower_growth = json!({});
    if user_info.get("data").is_some() {
        let now = OffsetDateTime::now_utc();
        let follower_count = user_info
            .pointer("/data/user/follower_count")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        if follower_count != 0 {
            if let Err(e) = app_state.followers.record(follower_count, now) {
                eprintln!("Failed to record follower count: {}", e);
            }
        }
        follower_growth = serde_json::to_value(app_state.followers.compute_growth(now))
            .unwrap_or_else(|_| json!({}));
    }

    Json(json!({
        "user": user_info,
        "videos": videos,
        "follower_growth": follower_growth,
    }))
}
