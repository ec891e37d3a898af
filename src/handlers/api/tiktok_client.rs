use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};

use crate::models::token::TokenStore;

const BASE_URL: &str = "https://open.tiktokapis.com/v2";

/// Full profile field set; sandbox credentials reject most of these.
const FULL_USER_FIELDS: &str = "open_id,union_id,avatar_url,display_name,bio_description,profile_deep_link,is_verified,follower_count,following_count,likes_count,video_count";
/// Fields every scope grants.
const MINIMAL_USER_FIELDS: &str = "open_id,avatar_url,display_name";
// favourite_count is not available in sandbox, so it stays out of this list.
const VIDEO_FIELDS: &str = "id,title,video_description,duration,cover_image_url,share_url,view_count,like_count,comment_count,share_count,create_time";

/// Fetch the user profile. Tries the full field set first and degrades once
/// to the minimal set when the scope does not cover it.
pub async fn get_user_info(client: &reqwest::Client, tokens: &TokenStore) -> Value {
    let Some(record) = tokens.load() else {
        return json!({"error": "No token found"});
    };

    let url = format!("{}/user/info/", BASE_URL);
    let result = fetch_user_fields(client, &record.access_token, &url, FULL_USER_FIELDS).await;

    if scope_not_authorized(&result) {
        eprintln!("Full user info not available, trying minimal fields...");
        return fetch_user_fields(client, &record.access_token, &url, MINIMAL_USER_FIELDS).await;
    }

    result
}

/// Fetch the user's videos. The provider response is passed through verbatim,
/// errors included.
pub async fn get_video_list(
    client: &reqwest::Client,
    tokens: &TokenStore,
    cursor: u64,
    max_count: u32,
) -> Value {
    let Some(record) = tokens.load() else {
        return json!({"error": "No token found"});
    };

    let url = format!("{}/video/list/", BASE_URL);
    let body = json!({
        "max_count": max_count,
        "cursor": cursor,
    });

    let response = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {}", record.access_token))
        .query(&[("fields", VIDEO_FIELDS)])
        .json(&body)
        .send()
        .await;

    match response {
        Ok(res) => match res.json::<Value>().await {
            Ok(value) => value,
            Err(e) => json!({"error": format!("video list response was not JSON: {}", e)}),
        },
        Err(e) => json!({"error": format!("video list request failed: {}", e)}),
    }
}

async fn fetch_user_fields(
    client: &reqwest::Client,
    token: &str,
    url: &str,
    fields: &str,
) -> Value {
    let response = client
        .get(url)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .query(&[("fields", fields)])
        .send()
        .await;

    match response {
        Ok(res) => match res.json::<Value>().await {
            Ok(value) => value,
            Err(e) => json!({"error": format!("user info response was not JSON: {}", e)}),
        },
        Err(e) => json!({"error": format!("user info request failed: {}", e)}),
    }
}

fn scope_not_authorized(result: &Value) -> bool {
    result
        .get("error")
        .and_then(|error| error.get("code"))
        .and_then(Value::as_str)
        == Some("scope_not_authorized")
}
