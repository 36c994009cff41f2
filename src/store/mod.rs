//! The observable client store.
//!
//! This module contains [`ClientStore`], which owns the backend API client,
//! the durable session record, and a single [`AppState`] snapshot. Reads hand
//! out the snapshot as an `Arc`; every mutation replaces the snapshot
//! atomically and then notifies subscribers synchronously in registration
//! order.
//!
//! Operations are grouped by concern:
//! - bootstrap and cache loads (`bootstrap`)
//! - session lifecycle: login, logout, activity and expiry (`auth`)
//! - tweet mutations and like/retweet toggles (`tweets`)
//! - follow toggle and feed selectors (`social`)
//! - notification reads (`notifications`)
//! - search passthroughs (`search`)

mod auth;
mod bootstrap;
mod notifications;
mod search;
mod social;
mod state;
mod tweets;

pub use state::AppState;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::api::{ApiClient, ApiError, NewAccount};
use crate::config::StoreConfig;
use crate::models::{Tweet, User};
use crate::session::{SessionStore, StoredSession};

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation needs a signed-in user
    #[error("not authenticated")]
    NotAuthenticated,

    /// The backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle that deregisters a store listener.
///
/// Consume it with [`Subscription::unsubscribe`]. Dropping the handle
/// without unsubscribing leaves the listener registered for the life of
/// the store.
#[must_use = "dropping a Subscription does not deregister the listener; call unsubscribe()"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Deregister the listener.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

struct StoreInner {
    /// Client for the main backend
    api: ApiClient,
    /// Durable session record
    session: SessionStore,
    /// The published snapshot
    state: RwLock<Arc<AppState>>,
    /// Change listeners in registration order
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

/// The observable client store. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct ClientStore {
    inner: Arc<StoreInner>,
}

impl ClientStore {
    /// Build a store from configuration.
    ///
    /// Returns `None` when no session path is configured and the home
    /// directory cannot be determined.
    pub fn new(config: StoreConfig) -> Option<Self> {
        let session = match config.session_path {
            Some(path) => SessionStore::at_path(path),
            None => SessionStore::new()?,
        };
        Some(Self::from_parts(
            ApiClient::with_base_url(config.api_base_url),
            session,
        ))
    }

    /// Assemble a store from an already-built API client and session store.
    pub fn from_parts(api: ApiClient, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                api,
                session,
                state: RwLock::new(Arc::new(AppState::default())),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// The backend API client, for calls the store does not wrap
    /// (e.g. image upload before posting a tweet).
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get the current state snapshot.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.inner.state.read())
    }

    /// Register a listener invoked synchronously after every committed
    /// state change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));

        let inner = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = inner.upgrade() {
                    inner.listeners.lock().retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Replace the snapshot through `mutate`, then notify subscribers.
    fn commit<F>(&self, mutate: F)
    where
        F: FnOnce(&mut AppState),
    {
        {
            let mut guard = self.inner.state.write();
            let mut next = AppState::clone(&guard);
            mutate(&mut next);
            *guard = Arc::new(next);
        }
        self.notify();
    }

    /// Invoke every listener once, in registration order.
    ///
    /// The list is copied out of the lock first so a listener can subscribe
    /// or unsubscribe without deadlocking the pass.
    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Write the session keys matching the given snapshot. The stored theme
    /// key is independent and keeps whatever value is on disk.
    fn persist_session(&self, state: &AppState) {
        let record = StoredSession {
            current_user_id: state.current_user_id.clone(),
            auth_token: state.auth_token.clone(),
            last_activity_at: state.last_activity_at,
            theme: self.inner.session.load().theme,
        };
        if let Err(e) = self.inner.session.save(&record) {
            tracing::warn!("Failed to persist session: {}", e);
        }
    }

    /// Flip the UI theme and persist the preference.
    ///
    /// Only the stored theme key is written; session keys on disk stay as
    /// they are, whether or not bootstrap has restored them yet.
    pub fn toggle_theme(&self) {
        self.commit(|state| state.theme = state.theme.toggled());
        if let Err(e) = self.inner.session.save_theme(self.state().theme) {
            tracing::warn!("Failed to persist theme: {}", e);
        }
    }

    /// Reset all state and wipe durable storage, theme included.
    pub fn clear_all_data(&self) {
        self.commit(|state| *state = AppState::default());
        if let Err(e) = self.inner.session.clear_all() {
            tracing::warn!("Failed to remove session file: {}", e);
        }
    }
}

/// The store contract as a trait, so composition roots and UI tests can
/// substitute a mock.
#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Current state snapshot.
    fn state(&self) -> Arc<AppState>;

    /// Register a change listener.
    fn subscribe(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription;

    /// Bootstrap: restore the persisted session and fill the caches.
    async fn initialize_app(&self);

    /// Log in with handle and password.
    async fn login(&self, handle: &str, password: &str) -> Result<(), StoreError>;

    /// Register a new account and sign it in.
    async fn register(&self, new_account: NewAccount) -> Result<(), StoreError>;

    /// Commit an already-authenticated session.
    async fn login_with_user(&self, user: User, token: String);

    /// Sign out, optionally recording a user-visible reason.
    fn logout(&self, reason: Option<String>);

    /// Record user activity now, in state and durable storage.
    fn record_activity_timestamp(&self);

    /// Whether the session has outlived the inactivity timeout.
    fn has_session_expired(&self) -> bool;

    /// Clear the one-shot session notice.
    fn clear_auth_message(&self);

    /// Toggle a like on a tweet.
    async fn toggle_like(&self, tweet_id: &str) -> Result<(), StoreError>;

    /// Toggle a retweet on a tweet.
    async fn toggle_retweet(&self, tweet_id: &str) -> Result<(), StoreError>;

    /// Toggle following a user.
    async fn toggle_follow(&self, user_id: &str) -> Result<(), StoreError>;

    /// Post a tweet.
    async fn add_tweet(&self, content: &str, image_url: Option<String>) -> Result<(), StoreError>;

    /// Post a reply to a tweet.
    async fn add_reply(&self, parent_id: &str, content: &str) -> Result<(), StoreError>;

    /// Delete one of the signed-in user's tweets.
    async fn delete_tweet(&self, tweet_id: &str) -> Result<(), StoreError>;

    /// Replace the tweet cache with one user's tweets.
    async fn load_user_tweets(&self, user_id: &str);

    /// Search tweets; empty on failure.
    async fn search_tweets(&self, query: &str) -> Vec<Tweet>;

    /// Search users; empty on failure.
    async fn search_users(&self, query: &str) -> Vec<User>;

    /// Update the search box echo field.
    fn set_search_query(&self, query: &str);

    /// Mark one notification as read.
    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), StoreError>;

    /// Mark all of the signed-in user's notifications as read.
    async fn mark_all_notifications_read(&self) -> Result<(), StoreError>;

    /// Flip the UI theme.
    fn toggle_theme(&self);

    /// Reset all state and wipe durable storage.
    fn clear_all_data(&self);

    /// Tweets authored by a user.
    fn user_feed(&self, user_id: &str) -> Vec<Tweet>;

    /// Tweets by a user and everyone they follow, newest first.
    fn following_feed(&self, user_id: &str) -> Vec<Tweet>;

    /// Tweets a user has liked.
    fn liked_tweets(&self, user_id: &str) -> Vec<Tweet>;

    /// Tweets a user has retweeted.
    fn retweeted_tweets(&self, user_id: &str) -> Vec<Tweet>;
}

#[async_trait]
impl SocialStore for ClientStore {
    fn state(&self) -> Arc<AppState> {
        ClientStore::state(self)
    }

    fn subscribe(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription {
        ClientStore::subscribe(self, listener)
    }

    async fn initialize_app(&self) {
        ClientStore::initialize_app(self).await
    }

    async fn login(&self, handle: &str, password: &str) -> Result<(), StoreError> {
        ClientStore::login(self, handle, password).await
    }

    async fn register(&self, new_account: NewAccount) -> Result<(), StoreError> {
        ClientStore::register(self, new_account).await
    }

    async fn login_with_user(&self, user: User, token: String) {
        ClientStore::login_with_user(self, user, token).await
    }

    fn logout(&self, reason: Option<String>) {
        ClientStore::logout(self, reason)
    }

    fn record_activity_timestamp(&self) {
        ClientStore::record_activity_timestamp(self)
    }

    fn has_session_expired(&self) -> bool {
        ClientStore::has_session_expired(self)
    }

    fn clear_auth_message(&self) {
        ClientStore::clear_auth_message(self)
    }

    async fn toggle_like(&self, tweet_id: &str) -> Result<(), StoreError> {
        ClientStore::toggle_like(self, tweet_id).await
    }

    async fn toggle_retweet(&self, tweet_id: &str) -> Result<(), StoreError> {
        ClientStore::toggle_retweet(self, tweet_id).await
    }

    async fn toggle_follow(&self, user_id: &str) -> Result<(), StoreError> {
        ClientStore::toggle_follow(self, user_id).await
    }

    async fn add_tweet(&self, content: &str, image_url: Option<String>) -> Result<(), StoreError> {
        ClientStore::add_tweet(self, content, image_url).await
    }

    async fn add_reply(&self, parent_id: &str, content: &str) -> Result<(), StoreError> {
        ClientStore::add_reply(self, parent_id, content).await
    }

    async fn delete_tweet(&self, tweet_id: &str) -> Result<(), StoreError> {
        ClientStore::delete_tweet(self, tweet_id).await
    }

    async fn load_user_tweets(&self, user_id: &str) {
        ClientStore::load_user_tweets(self, user_id).await
    }

    async fn search_tweets(&self, query: &str) -> Vec<Tweet> {
        ClientStore::search_tweets(self, query).await
    }

    async fn search_users(&self, query: &str) -> Vec<User> {
        ClientStore::search_users(self, query).await
    }

    fn set_search_query(&self, query: &str) {
        ClientStore::set_search_query(self, query)
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), StoreError> {
        ClientStore::mark_notification_read(self, notification_id).await
    }

    async fn mark_all_notifications_read(&self) -> Result<(), StoreError> {
        ClientStore::mark_all_notifications_read(self).await
    }

    fn toggle_theme(&self) {
        ClientStore::toggle_theme(self)
    }

    fn clear_all_data(&self) {
        ClientStore::clear_all_data(self)
    }

    fn user_feed(&self, user_id: &str) -> Vec<Tweet> {
        ClientStore::user_feed(self, user_id)
    }

    fn following_feed(&self, user_id: &str) -> Vec<Tweet> {
        ClientStore::following_feed(self, user_id)
    }

    fn liked_tweets(&self, user_id: &str) -> Vec<Tweet> {
        ClientStore::liked_tweets(self, user_id)
    }

    fn retweeted_tweets(&self, user_id: &str) -> Vec<Tweet> {
        ClientStore::retweeted_tweets(self, user_id)
    }
}
