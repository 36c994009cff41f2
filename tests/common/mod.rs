//! Common test utilities for the store integration tests.
//!
//! Provides wire-format JSON builders for users, tweets, and notifications,
//! plus a helper that wires a [`ClientStore`] to a wiremock backend with a
//! throwaway session file.
//!
//! # Example
//!
//! ```ignore
//! let server = MockServer::start().await;
//! let harness = store_with_server(&server.uri());
//! harness.store.initialize_app().await;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use twittlite::prelude::*;

/// Backend user document in the shape the API returns.
pub fn json_user(id: &str, handle: &str) -> Value {
    json!({
        "_id": id,
        "handle": handle,
        "name": handle,
        "avatarUrl": null,
        "bio": null,
        "followers": [],
        "following": [],
        "followerCount": 0,
        "followingCount": 0,
        "createdAt": "2026-08-01T10:00:00Z"
    })
}

/// Backend tweet document with an embedded author.
pub fn json_tweet(id: &str, author: &Value, content: &str) -> Value {
    json!({
        "_id": id,
        "author": author,
        "content": content,
        "imageUrl": null,
        "parentTweet": null,
        "likes": [],
        "retweets": [],
        "replies": [],
        "likeCount": 0,
        "retweetCount": 0,
        "replyCount": 0,
        "createdAt": "2026-08-02T12:00:00Z",
        "verification": null
    })
}

/// Backend notification document.
#[allow(dead_code)]
pub fn json_notification(id: &str, user_id: &str, from_user: &Value, kind: &str) -> Value {
    json!({
        "_id": id,
        "user": user_id,
        "fromUser": from_user,
        "type": kind,
        "tweet": null,
        "message": format!("{} happened", kind),
        "read": false,
        "createdAt": "2026-08-02T12:30:00Z"
    })
}

/// A store wired to a mock backend, with its session file in a tempdir.
pub struct TestStore {
    pub store: ClientStore,
    pub temp_dir: TempDir,
}

impl TestStore {
    /// Path of the session file backing this store.
    pub fn session_path(&self) -> PathBuf {
        self.temp_dir.path().join("session.json")
    }

    /// Re-read the durable session record from disk.
    pub fn stored_session(&self) -> StoredSession {
        SessionStore::at_path(self.session_path()).load()
    }
}

/// Builds a store whose API base points at the given mock server.
pub fn store_with_server(server_uri: &str) -> TestStore {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::new()
        .with_api_base_url(format!("{}/api", server_uri))
        .with_session_path(temp_dir.path().join("session.json"));
    let store = ClientStore::new(config).unwrap();
    TestStore { store, temp_dir }
}

/// Writes a session record for bootstrap tests, before the store boots.
#[allow(dead_code)]
pub fn seed_session(session_path: PathBuf, user_id: &str, token: &str, last_activity_at: i64) {
    let record = StoredSession {
        current_user_id: Some(user_id.to_string()),
        auth_token: Some(token.to_string()),
        last_activity_at: Some(last_activity_at),
        theme: None,
    };
    SessionStore::at_path(session_path).save(&record).unwrap();
}

/// Mounts empty responses for the users and tweets cache loads.
#[allow(dead_code)]
pub async fn mount_empty_loads(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Polls `predicate` until it holds or the timeout elapses. Returns whether
/// the predicate held.
#[allow(dead_code)]
pub async fn wait_until<F>(mut predicate: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
