use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use oauth2::{CsrfToken, PkceCodeChallenge};

use crate::models::AppState;

const AUTHORIZE_URL: &str = "https://www.tiktok.com/v2/auth/authorize";
const SCOPES: &str = "user.info.basic,video.list";

pub async fn login_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let state_token = CsrfToken::new_random();

    // The verifier stays server-side; only the challenge leaves in the URL.
    app_state.attempts.put(
        state_token.secret().to_string(),
        pkce_verifier.secret().to_string(),
    );

    let mut url = reqwest::Url::parse(AUTHORIZE_URL).expect("Failed to parse auth URL");
    url.query_pairs_mut()
        .append_pair("client_key", &app_state.config.client_key)
        .append_pair("scope", SCOPES)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &app_state.config.redirect_uri)
        .append_pair("state", state_token.secret())
        .append_pair("code_challenge", pkce_challenge.as_str())
        .append_pair("code_challenge_method", "S256");

    eprintln!("Redirecting to TikTok login...");
    (
        StatusCode::FOUND,
        [(header::LOCATION, url.to_string())],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use oauth2::PkceCodeChallenge;

    #[test]
    fn challenge_is_sha256_of_the_verifier() {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let recomputed = PkceCodeChallenge::from_code_verifier_sha256(&verifier);
        assert_eq!(challenge.as_str(), recomputed.as_str());
    }

    #[test]
    fn challenge_is_urlsafe_without_padding() {
        for _ in 0..16 {
            let (challenge, _) = PkceCodeChallenge::new_random_sha256();
            assert!(!challenge.as_str().contains('='));
            assert!(!challenge.as_str().contains('+'));
            assert!(!challenge.as_str().contains('/'));
        }
    }

    #[test]
    fn verifier_carries_at_least_256_bits() {
        let (_, verifier) = PkceCodeChallenge::new_random_sha256();
        // 43 base64url characters encode the 32 random bytes.
        assert!(verifier.secret().len() >= 43);
    }
}
