use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::models::oauth::{CallbackParams, ExchangeError, TokenExchangeResponse};
use crate::models::token::TokenRecord;
use crate::models::{AppConfig, AppState};

const TOKEN_URL: &str = "https://open.tiktokapis.com/v2/oauth/token/";

pub async fn callback_handler(
    Query(params): Query<CallbackParams>,
    State(app_state): State<AppState>,
) -> Response {
    if let Some(error) = params.error {
        let description = params
            .error_description
            .unwrap_or_else(|| "Unknown error".to_string());
        eprintln!("TikTok returned an authorization error: {}: {}", error, description);
        // Rendered as a normal page so a human in the browser can read it.
        return Html(format!("<h1>Login Error</h1><p>{}: {}</p>", error, description))
            .into_response();
    }

    let (Some(code), Some(state)) = (params.code, params.state) else {
        return (
            StatusCode::BAD_REQUEST,
            Html("<h1>Error</h1><p>Missing code or state from TikTok.</p>".to_string()),
        )
            .into_response();
    };

    eprintln!("OAuth callback received. State: {}", state);

    let Some(verifier) = app_state.attempts.take(&state) else {
        return (
            StatusCode::BAD_REQUEST,
            Html("<h1>Error</h1><p>Session expired. Please try logging in again.</p>".to_string()),
        )
            .into_response();
    };

    let record = match exchange_code(&app_state.http, &app_state.config, &code, &verifier).await {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Token exchange failed: {}", e.message());
            return Html(failure_page(&e)).into_response();
        }
    };

    if let Err(e) = app_state.tokens.save(&record) {
        eprintln!("Failed to persist token: {}", e);
        return Html(format!("<h1>Error</h1><p>Failed to save token: {}</p>", e)).into_response();
    }

    eprintln!("Token saved to token.json!");
    Html(success_page().to_string()).into_response()
}

/// Exchange the authorization code plus PKCE verifier for a token record.
/// The response body is interpreted regardless of HTTP status; TikTok puts
/// its answer in the JSON either way.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &AppConfig,
    code: &str,
    verifier: &str,
) -> Result<TokenRecord, ExchangeError> {
    let params = [
        ("client_key", config.client_key.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    eprintln!("Exchanging code for access token...");
    let response = client
        .post(TOKEN_URL)
        .form(&params)
        .send()
        .await
        .map_err(ExchangeError::Transport)?;

    let payload: TokenExchangeResponse =
        response.json().await.map_err(ExchangeError::Transport)?;

    payload.into_result().map_err(ExchangeError::Provider)
}

fn failure_page(error: &ExchangeError) -> String {
    match error {
        ExchangeError::Provider(payload) => {
            let pretty =
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            format!(
                "<h1>Error</h1><p>{}</p><pre>{}</pre>",
                error.message(),
                pretty
            )
        }
        ExchangeError::Transport(e) => format!(
            "<h1>Error</h1><p>Failed to exchange token: {}. Please try logging in again.</p>",
            e
        ),
    }
}

fn success_page() -> &'static str {
    r#"<!DOCTYPE html>
<html>
<body style="background:#010101;color:#fff;font-family:sans-serif;display:flex;justify-content:center;align-items:center;height:100vh;flex-direction:column;">
<h1 style="color:#4ade80;">&#10003; Connected!</h1>
<p>Your TikTok account is now linked to the dashboard.</p>
<p style="color:#888;">Redirecting to dashboard...</p>
<script>setTimeout(() => window.location.href = '/dashboard.html', 2000);</script>
</body>
</html>
"#
}
