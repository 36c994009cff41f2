//! Durable session storage for the Twittlite client.
//!
//! This module stores the signed-in user's id and auth token, the inactivity
//! clock, and the UI theme in `~/.twittlite/session.json` so a restart can
//! resume the session. The theme key is independent of the session keys and
//! survives a logout.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Theme;

/// The session directory name.
const SESSION_DIR: &str = ".twittlite";

/// The session file name.
const SESSION_FILE: &str = "session.json";

/// How long a session survives without user activity, in milliseconds.
pub const INACTIVITY_TIMEOUT_MS: i64 = 10 * 60 * 1000;

/// Notice surfaced to the user after an inactivity logout.
pub const INACTIVITY_LOGOUT_MESSAGE: &str =
    "You were signed out after 10 minutes of inactivity. Please log in again.";

/// Current time as milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Whether a session with the given last-activity timestamp has expired.
///
/// A session with no recorded activity counts as expired, so a stale record
/// written before the inactivity clock existed can never resume.
pub fn session_expired(last_activity_at: Option<i64>, now_ms: i64) -> bool {
    match last_activity_at {
        Some(at) => now_ms - at >= INACTIVITY_TIMEOUT_MS,
        None => true,
    }
}

/// The persisted session record.
///
/// `lastActivityAt` is written as a decimal string rather than a JSON number;
/// readers accept either form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Id of the signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<String>,
    /// Bearer token issued at login or registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Last user activity, milliseconds since the Unix epoch.
    #[serde(default, with = "millis_string", skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<i64>,
    /// UI theme preference. Independent of the session keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl StoredSession {
    /// Check if the record names a user to resume.
    pub fn has_user(&self) -> bool {
        self.current_user_id.is_some()
    }

    /// Check if the recorded session has outlived the inactivity timeout.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        session_expired(self.last_activity_at, now_ms)
    }
}

/// Serialize the activity timestamp as a string, accept string or number back.
mod millis_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ms) => serializer.serialize_some(&ms.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(ms)) => Ok(Some(ms)),
            Some(Raw::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| de::Error::custom("lastActivityAt is not a millisecond timestamp")),
        }
    }
}

/// Errors from reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Manages the on-disk session record.
#[derive(Debug)]
pub struct SessionStore {
    /// Path to the session file.
    session_path: PathBuf,
}

impl SessionStore {
    /// Create a SessionStore rooted in the user's home directory.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        let session_path = home.join(SESSION_DIR).join(SESSION_FILE);
        Some(Self { session_path })
    }

    /// Create a SessionStore backed by an explicit file path.
    pub fn at_path(session_path: PathBuf) -> Self {
        Self { session_path }
    }

    /// Get the path to the session file.
    pub fn path(&self) -> &PathBuf {
        &self.session_path
    }

    /// Load the session record.
    ///
    /// Returns a default record if the file doesn't exist or can't be parsed.
    pub fn load(&self) -> StoredSession {
        if !self.session_path.exists() {
            return StoredSession::default();
        }

        let file = match File::open(&self.session_path) {
            Ok(f) => f,
            Err(_) => return StoredSession::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(session) => session,
            Err(_) => StoredSession::default(),
        }
    }

    /// Save the session record, creating the parent directory if needed.
    pub fn save(&self, session: &StoredSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.session_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.session_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, session)?;
        writer.flush()?;
        Ok(())
    }

    /// Update the stored theme, leaving the session keys as they are.
    pub fn save_theme(&self, theme: Theme) -> Result<(), SessionStoreError> {
        let mut record = self.load();
        record.theme = Some(theme);
        self.save(&record)
    }

    /// Remove the session keys but keep the theme preference.
    pub fn clear_session(&self) -> Result<(), SessionStoreError> {
        if !self.session_path.exists() {
            return Ok(());
        }
        let theme = self.load().theme;
        self.save(&StoredSession {
            theme,
            ..StoredSession::default()
        })
    }

    /// Remove the session file entirely, theme included.
    pub fn clear_all(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.session_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // Helper to create a SessionStore under a temp directory
    fn create_test_store(temp_dir: &TempDir) -> SessionStore {
        SessionStore::at_path(temp_dir.path().join(SESSION_DIR).join(SESSION_FILE))
    }

    #[test]
    fn test_session_expired_without_activity() {
        assert!(session_expired(None, 1_000_000));
    }

    #[test]
    fn test_session_expired_exactly_at_timeout() {
        let now = 2_000_000_000;
        assert!(session_expired(Some(now - INACTIVITY_TIMEOUT_MS), now));
    }

    #[test]
    fn test_session_not_expired_just_under_timeout() {
        let now = 2_000_000_000;
        assert!(!session_expired(Some(now - INACTIVITY_TIMEOUT_MS + 1), now));
    }

    #[test]
    fn test_stored_session_default() {
        let session = StoredSession::default();
        assert!(session.current_user_id.is_none());
        assert!(session.auth_token.is_none());
        assert!(session.last_activity_at.is_none());
        assert!(session.theme.is_none());
        assert!(!session.has_user());
        assert!(session.is_expired(now_millis()));
    }

    #[test]
    fn test_last_activity_round_trips_as_string() {
        let session = StoredSession {
            current_user_id: Some("u1".to_string()),
            auth_token: Some("token".to_string()),
            last_activity_at: Some(1_724_500_000_123),
            theme: Some(Theme::Dark),
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["lastActivityAt"], serde_json::json!("1724500000123"));
        assert_eq!(json["currentUserId"], serde_json::json!("u1"));
        assert_eq!(json["theme"], serde_json::json!("dark"));

        let back: StoredSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_last_activity_accepts_numeric_form() {
        let back: StoredSession =
            serde_json::from_str(r#"{"currentUserId":"u1","lastActivityAt":1724500000123}"#)
                .unwrap();
        assert_eq!(back.last_activity_at, Some(1_724_500_000_123));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);
        assert_eq!(store.load(), StoredSession::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        let session = StoredSession {
            current_user_id: Some("user-123".to_string()),
            auth_token: Some("bearer-token".to_string()),
            last_activity_at: Some(1_234_567_890),
            theme: Some(Theme::Light),
        };

        store.save(&session).unwrap();
        assert_eq!(store.load(), session);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        assert!(!store.path().parent().unwrap().exists());
        store.save(&StoredSession::default()).unwrap();
        assert!(store.path().parent().unwrap().exists());
    }

    #[test]
    fn test_load_invalid_json_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not valid json").unwrap();

        assert_eq!(store.load(), StoredSession::default());
    }

    #[test]
    fn test_save_theme_keeps_session_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store
            .save(&StoredSession {
                current_user_id: Some("u1".to_string()),
                auth_token: Some("token".to_string()),
                last_activity_at: Some(1_234_567_890),
                theme: Some(Theme::Light),
            })
            .unwrap();

        store.save_theme(Theme::Dark).unwrap();

        let after = store.load();
        assert_eq!(after.current_user_id.as_deref(), Some("u1"));
        assert_eq!(after.auth_token.as_deref(), Some("token"));
        assert_eq!(after.last_activity_at, Some(1_234_567_890));
        assert_eq!(after.theme, Some(Theme::Dark));
    }

    #[test]
    fn test_save_theme_without_file_writes_theme_only() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store.save_theme(Theme::Dark).unwrap();

        let after = store.load();
        assert_eq!(after.theme, Some(Theme::Dark));
        assert!(!after.has_user());
        assert!(after.last_activity_at.is_none());
    }

    #[test]
    fn test_clear_session_preserves_theme() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store
            .save(&StoredSession {
                current_user_id: Some("u1".to_string()),
                auth_token: Some("token".to_string()),
                last_activity_at: Some(1_234_567_890),
                theme: Some(Theme::Dark),
            })
            .unwrap();

        store.clear_session().unwrap();

        let after = store.load();
        assert!(after.current_user_id.is_none());
        assert!(after.auth_token.is_none());
        assert!(after.last_activity_at.is_none());
        assert_eq!(after.theme, Some(Theme::Dark));
    }

    #[test]
    fn test_clear_session_without_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);
        store.clear_session().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_all_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store
            .save(&StoredSession {
                theme: Some(Theme::Dark),
                ..StoredSession::default()
            })
            .unwrap();
        assert!(store.path().exists());

        store.clear_all().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.load(), StoredSession::default());
    }

    #[test]
    fn test_clear_all_without_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);
        store.clear_all().unwrap();
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        // A file written by an older client may carry keys we no longer use
        let json = r#"{
            "currentUserId": "u1",
            "authToken": "tok",
            "lastActivityAt": "1724500000123",
            "theme": "dark",
            "userFeeds": {}
        }"#;

        let session: StoredSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.current_user_id, Some("u1".to_string()));
        assert_eq!(session.last_activity_at, Some(1_724_500_000_123));
    }
}
