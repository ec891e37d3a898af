use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;

use crate::models::token::TokenRecord;

/// Query parameters TikTok appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// How long a pending login may wait for its callback.
const ATTEMPT_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug)]
struct Attempt {
    verifier: String,
    created_at: Instant,
}

/// Pending login attempts, keyed by the one-time state token.
///
/// Entries live only in this process, so an in-flight login does not survive
/// a restart. `take` consumes the entry; a replayed callback gets nothing.
#[derive(Debug)]
pub struct LoginAttempts {
    ttl: Duration,
    entries: Mutex<HashMap<String, Attempt>>,
}

impl LoginAttempts {
    pub fn new() -> Self {
        Self::with_ttl(ATTEMPT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn put(&self, state: String, verifier: String) {
        let mut entries = self.entries.lock().expect("login attempts lock");
        self.purge_expired(&mut entries);
        entries.insert(
            state,
            Attempt {
                verifier,
                created_at: Instant::now(),
            },
        );
    }

    pub fn take(&self, state: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("login attempts lock");
        self.purge_expired(&mut entries);
        entries.remove(state).map(|attempt| attempt.verifier)
    }

    fn purge_expired(&self, entries: &mut HashMap<String, Attempt>) {
        let now = Instant::now();
        entries.retain(|_, attempt| now.duration_since(attempt.created_at) < self.ttl);
    }
}

impl Default for LoginAttempts {
    fn default() -> Self {
        Self::new()
    }
}

/// The token endpoint answers in one of three shapes: the token object
/// directly, the token object under a `data` key, or an error payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TokenExchangeResponse {
    Granted(TokenRecord),
    Wrapped { data: TokenRecord },
    Denied(Value),
}

impl TokenExchangeResponse {
    pub fn into_result(self) -> Result<TokenRecord, Value> {
        match self {
            Self::Granted(record) => Ok(record),
            Self::Wrapped { data } => Ok(data),
            Self::Denied(payload) => Err(payload),
        }
    }
}

#[derive(Debug)]
pub enum ExchangeError {
    /// The provider answered with an error payload, kept verbatim.
    Provider(Value),
    Transport(reqwest::Error),
}

impl ExchangeError {
    /// Message for the callback page, preferring the provider's own
    /// description of what went wrong.
    pub fn message(&self) -> String {
        match self {
            Self::Provider(payload) => payload
                .get("error_description")
                .and_then(Value::as_str)
                .or_else(|| payload.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| payload.to_string()),
            Self::Transport(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn take_returns_verifier_exactly_once() {
        let attempts = LoginAttempts::new();
        attempts.put("state-123".into(), "verifier".into());
        assert_eq!(attempts.take("state-123"), Some("verifier".into()));
        assert_eq!(attempts.take("state-123"), None);
    }

    #[test]
    fn take_of_unknown_state_fails() {
        let attempts = LoginAttempts::new();
        assert_eq!(attempts.take("never-stored"), None);
    }

    #[test]
    fn expired_attempts_are_dropped() {
        let attempts = LoginAttempts::with_ttl(Duration::from_millis(50));
        attempts.put("state-exp".into(), "verifier".into());
        thread::sleep(Duration::from_millis(70));
        assert_eq!(attempts.take("state-exp"), None);
    }

    #[test]
    fn flat_token_response_is_granted() {
        let parsed: TokenExchangeResponse =
            serde_json::from_str(r#"{"access_token": "abc", "scope": "user.info.basic"}"#)
                .unwrap();
        let record = parsed.into_result().unwrap();
        assert_eq!(record.access_token, "abc");
        assert_eq!(
            record.extra.get("scope"),
            Some(&Value::String("user.info.basic".into()))
        );
    }

    #[test]
    fn nested_token_response_unwraps_to_the_same_record() {
        let flat: TokenExchangeResponse =
            serde_json::from_str(r#"{"access_token": "abc", "open_id": "u1"}"#).unwrap();
        let nested: TokenExchangeResponse =
            serde_json::from_str(r#"{"data": {"access_token": "abc", "open_id": "u1"}}"#).unwrap();
        assert_eq!(
            flat.into_result().unwrap(),
            nested.into_result().unwrap()
        );
    }

    #[test]
    fn error_payload_is_denied_and_surfaces_description() {
        let parsed: TokenExchangeResponse = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "expired code"}"#,
        )
        .unwrap();
        let payload = parsed.into_result().unwrap_err();
        let message = ExchangeError::Provider(payload).message();
        assert!(message.contains("expired code"));
    }

    #[test]
    fn error_payload_falls_back_to_message_field() {
        let parsed: TokenExchangeResponse =
            serde_json::from_str(r#"{"message": "client_key mismatch"}"#).unwrap();
        let payload = parsed.into_result().unwrap_err();
        assert_eq!(
            ExchangeError::Provider(payload).message(),
            "client_key mismatch"
        );
    }

    #[test]
    fn data_without_access_token_is_denied() {
        let parsed: TokenExchangeResponse =
            serde_json::from_str(r#"{"data": {"captcha": "needed"}}"#).unwrap();
        assert!(parsed.into_result().is_err());
    }
}
