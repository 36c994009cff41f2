//! Integration tests for the follow toggle and search passthroughs.
//!
//! These tests cover:
//! - Follow/unfollow updating both cached users' edge lists from the
//!   server's boolean, while the denormalized counts stay as loaded
//! - The cache update being skipped when either side is not cached
//! - Searches returning results to the caller without touching the cache

mod common;

use common::*;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Boots a store with a restored session for `u1` and the given user cache.
async fn booted_store(server: &MockServer, ada: &Value, all_users: Value) -> TestStore {
    Mock::given(method("GET"))
        .and(path("/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ada))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&all_users))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;

    let harness = store_with_server(&server.uri());
    seed_session(
        harness.session_path(),
        "u1",
        "tok",
        chrono::Utc::now().timestamp_millis(),
    );
    harness.store.initialize_app().await;
    assert!(harness.store.state().is_authenticated);
    harness
}

// ============================================================================
// Follow
// ============================================================================

#[tokio::test]
async fn test_follow_updates_both_cached_users() {
    let server = MockServer::start().await;
    let ada = json_user("u1", "ada");
    let bob = json_user("u2", "bob");

    Mock::given(method("POST"))
        .and(path("/api/users/u2/follow"))
        .and(body_json(json!({ "currentUserId": "u1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isFollowing": true })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = booted_store(&server, &ada, json!([ada.clone(), bob])).await;
    harness.store.toggle_follow("u2").await.unwrap();

    let state = harness.store.state();
    let me = &state.users["u1"];
    let target = &state.users["u2"];
    assert!(me.following.iter().any(|id| id == "u2"));
    assert!(target.followers.iter().any(|id| id == "u1"));
    // Counts refresh with the next user load, not here
    assert_eq!(me.following_count, 0);
    assert_eq!(target.follower_count, 0);
}

#[tokio::test]
async fn test_unfollow_removes_edges() {
    let server = MockServer::start().await;
    let mut ada = json_user("u1", "ada");
    ada["following"] = json!(["u2"]);
    ada["followingCount"] = json!(1);
    let mut bob = json_user("u2", "bob");
    bob["followers"] = json!(["u1"]);
    bob["followerCount"] = json!(1);

    Mock::given(method("POST"))
        .and(path("/api/users/u2/follow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isFollowing": false })))
        .mount(&server)
        .await;

    let harness = booted_store(&server, &ada, json!([ada.clone(), bob])).await;
    harness.store.toggle_follow("u2").await.unwrap();

    let state = harness.store.state();
    assert!(state.users["u1"].following.is_empty());
    assert!(state.users["u2"].followers.is_empty());
    assert_eq!(state.users["u1"].following_count, 1);
    assert_eq!(state.users["u2"].follower_count, 1);
}

#[tokio::test]
async fn test_follow_skips_cache_update_when_target_unknown() {
    let server = MockServer::start().await;
    let ada = json_user("u1", "ada");

    Mock::given(method("POST"))
        .and(path("/api/users/u9/follow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isFollowing": true })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = booted_store(&server, &ada, json!([ada.clone()])).await;
    harness.store.toggle_follow("u9").await.unwrap();

    // No half-applied edge: the uncached target means no local update at all
    let state = harness.store.state();
    assert!(state.users["u1"].following.is_empty());
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_searches_pass_through_without_touching_cache() {
    let server = MockServer::start().await;
    let ada = json_user("u1", "ada");
    let bob = json_user("u2", "bob");

    Mock::given(method("GET"))
        .and(path("/api/users/search/bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([bob.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tweets/search/rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([json_tweet(
            "t9", &bob, "rust is nice"
        )])))
        .mount(&server)
        .await;

    let harness = booted_store(&server, &ada, json!([ada.clone()])).await;

    let found_users = harness.store.search_users("bob").await;
    assert_eq!(found_users.len(), 1);
    assert_eq!(found_users[0].handle, "bob");

    let found_tweets = harness.store.search_tweets("rust").await;
    assert_eq!(found_tweets.len(), 1);
    assert_eq!(found_tweets[0].id, "t9");

    // Results went to the caller; the shared tweet cache is unchanged
    assert!(harness.store.state().tweets.is_empty());
}

#[tokio::test]
async fn test_search_failure_degrades_to_empty() {
    let server = MockServer::start().await;
    let ada = json_user("u1", "ada");

    Mock::given(method("GET"))
        .and(path("/api/tweets/search/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "index down" })))
        .mount(&server)
        .await;

    let harness = booted_store(&server, &ada, json!([ada.clone()])).await;

    assert!(harness.store.search_tweets("broken").await.is_empty());
    assert!(harness.store.search_users("missing").await.is_empty());
}
