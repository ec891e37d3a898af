use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The most recent token payload, exactly as the provider returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    /// Everything else the provider sent (refresh_token, expires_in, scope,
    /// open_id, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Single-slot token persistence: one file, overwritten on every login.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The last saved record, or `None` when nobody has logged in yet.
    /// An unreadable file also reads as logged-out; the next successful
    /// login overwrites it.
    pub fn load(&self) -> Option<TokenRecord> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn save(&self, record: &TokenRecord) -> Result<(), String> {
        let pretty = serde_json::to_string_pretty(record)
            .map_err(|e| format!("failed to serialize token: {}", e))?;
        fs::write(&self.path, pretty)
            .map_err(|e| format!("failed to write {}: {}", self.path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TokenRecord {
        let mut extra = Map::new();
        extra.insert("refresh_token".into(), Value::String("r1".into()));
        extra.insert("expires_in".into(), Value::from(86400));
        TokenRecord {
            access_token: "abc".into(),
            extra,
        }
    }

    #[test]
    fn load_without_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let record = sample_record();
        store.save(&record).unwrap();
        assert_eq!(store.load(), Some(record));
    }

    #[test]
    fn save_overwrites_the_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&sample_record()).unwrap();

        let replacement = TokenRecord {
            access_token: "def".into(),
            extra: Map::new(),
        };
        store.save(&replacement).unwrap();
        assert_eq!(store.load(), Some(replacement));
    }

    #[test]
    fn corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json at all").unwrap();
        let store = TokenStore::new(path);
        assert!(store.load().is_none());
    }
}
