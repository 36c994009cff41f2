//! Session lifecycle: login, registration, logout, and the inactivity clock.

use super::{ClientStore, StoreError};
use crate::api::{ApiError, NewAccount};
use crate::models::User;
use crate::session::{now_millis, session_expired};

/// Text shown for a failed login or registration. Server-reported messages
/// pass through verbatim.
fn auth_error_message(err: &ApiError) -> String {
    match err.server_message() {
        Some(message) => message.to_string(),
        None => err.to_string(),
    }
}

impl ClientStore {
    /// Log in with handle and password.
    ///
    /// On failure the backend's message lands in `state.error` and the
    /// snapshot stays signed out.
    pub async fn login(&self, handle: &str, password: &str) -> Result<(), StoreError> {
        self.commit(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.inner.api.login(handle, password).await {
            Ok(auth) => {
                self.login_with_user(auth.user, auth.token).await;
                Ok(())
            }
            Err(e) => {
                let message = auth_error_message(&e);
                tracing::warn!("Login failed: {}", message);
                self.commit(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(e.into())
            }
        }
    }

    /// Create an account and sign it in.
    pub async fn register(&self, new_account: NewAccount) -> Result<(), StoreError> {
        self.commit(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.inner.api.register(&new_account).await {
            Ok(auth) => {
                self.login_with_user(auth.user, auth.token).await;
                Ok(())
            }
            Err(e) => {
                let message = auth_error_message(&e);
                tracing::warn!("Registration failed: {}", message);
                self.commit(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(e.into())
            }
        }
    }

    /// Commit an already-authenticated session.
    ///
    /// The user lands in the cache and the session record is persisted
    /// before this returns; tweets and notifications refresh in the
    /// background.
    pub async fn login_with_user(&self, user: User, token: String) {
        self.inner.api.set_auth_token(Some(token.clone()));
        self.commit(|state| {
            state.current_user_id = Some(user.id.clone());
            state.auth_token = Some(token);
            state.is_authenticated = true;
            state.last_activity_at = Some(now_millis());
            state.loading = false;
            state.error = None;
            state.auth_message = None;
            state.users.insert(user.id.clone(), user);
        });

        let snapshot = self.state();
        self.persist_session(&snapshot);

        let store = self.clone();
        tokio::spawn(async move {
            futures::join!(store.load_tweets(), store.load_notifications());
        });
    }

    /// Sign out. `reason`, when given, is surfaced as a one-shot notice
    /// (the inactivity timer passes the timeout message).
    pub fn logout(&self, reason: Option<String>) {
        self.inner.api.set_auth_token(None);
        self.commit(|state| {
            state.current_user_id = None;
            state.auth_token = None;
            state.is_authenticated = false;
            state.last_activity_at = None;
            state.notifications = Vec::new();
            state.auth_message = reason;
        });
        if let Err(e) = self.inner.session.clear_session() {
            tracing::warn!("Failed to clear session: {}", e);
        }
    }

    /// Stamp now as the last user activity, in state and durable storage.
    /// No-op when signed out.
    pub fn record_activity_timestamp(&self) {
        if !self.state().is_authenticated {
            return;
        }
        self.commit(|state| state.last_activity_at = Some(now_millis()));
        let snapshot = self.state();
        self.persist_session(&snapshot);
    }

    /// Whether the inactivity window has elapsed since the last recorded
    /// activity. True when no activity was ever recorded.
    pub fn has_session_expired(&self) -> bool {
        session_expired(self.state().last_activity_at, now_millis())
    }

    /// Clear the one-shot session notice once the UI has shown it.
    pub fn clear_auth_message(&self) {
        self.commit(|state| state.auth_message = None);
    }
}
