//! Application bootstrap: restore the persisted session, then fill the
//! user, tweet, and notification caches.

use super::ClientStore;
use crate::session::{now_millis, session_expired, StoredSession, INACTIVITY_LOGOUT_MESSAGE};

impl ClientStore {
    /// Restore the durable session and load the shared caches.
    ///
    /// A stored session only resumes when both the user id and the token are
    /// present and the inactivity window has not elapsed. An expired session
    /// is cleared and leaves a one-shot notice in `auth_message`; a session
    /// whose user can no longer be fetched is cleared quietly.
    pub async fn initialize_app(&self) {
        self.commit(|state| {
            state.loading = true;
            state.error = None;
        });

        let StoredSession {
            current_user_id,
            auth_token,
            last_activity_at,
            theme,
        } = self.inner.session.load();

        if let Some(theme) = theme {
            self.commit(|state| state.theme = theme);
        }

        match (current_user_id, auth_token) {
            (Some(user_id), Some(token)) => {
                if session_expired(last_activity_at, now_millis()) {
                    tracing::info!(user_id = %user_id, "Session expired after inactivity");
                    self.commit(|state| {
                        state.current_user_id = None;
                        state.auth_token = None;
                        state.is_authenticated = false;
                        state.last_activity_at = None;
                        state.auth_message = Some(INACTIVITY_LOGOUT_MESSAGE.to_string());
                    });
                    if let Err(e) = self.inner.session.clear_session() {
                        tracing::warn!("Failed to clear expired session: {}", e);
                    }
                } else {
                    self.inner.api.set_auth_token(Some(token.clone()));
                    match self.inner.api.user(&user_id).await {
                        Ok(user) => {
                            self.commit(|state| {
                                state.current_user_id = Some(user.id.clone());
                                state.auth_token = Some(token);
                                state.is_authenticated = true;
                                state.last_activity_at = last_activity_at;
                                state.users.insert(user.id.clone(), user);
                            });
                        }
                        Err(e) => {
                            tracing::warn!("Failed to restore session for {}: {}", user_id, e);
                            self.inner.api.set_auth_token(None);
                            self.commit(|state| {
                                state.current_user_id = None;
                                state.auth_token = None;
                                state.is_authenticated = false;
                                state.last_activity_at = None;
                            });
                            if let Err(e) = self.inner.session.clear_session() {
                                tracing::warn!("Failed to clear stale session: {}", e);
                            }
                        }
                    }
                }
            }
            (None, None) => {}
            _ => {
                // Half a session record is unusable
                if let Err(e) = self.inner.session.clear_session() {
                    tracing::warn!("Failed to clear partial session: {}", e);
                }
            }
        }

        futures::join!(self.load_users(), self.load_tweets(), self.load_notifications());

        self.commit(|state| state.loading = false);
    }

    /// Refresh the user cache. Keeps the previous map when the fetch fails.
    pub(crate) async fn load_users(&self) {
        match self.inner.api.users().await {
            Ok(users) => {
                self.commit(|state| {
                    state.users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
                });
            }
            Err(e) => {
                tracing::warn!("Failed to load users: {}", e);
            }
        }
    }

    /// Refresh the global tweet cache. Resets to empty when the fetch fails.
    pub(crate) async fn load_tweets(&self) {
        match self.inner.api.tweets(None).await {
            Ok(tweets) => self.commit(|state| state.tweets = tweets),
            Err(e) => {
                tracing::warn!("Failed to load tweets: {}", e);
                self.commit(|state| state.tweets = Vec::new());
            }
        }
    }

    /// Replace the tweet cache with one user's tweets, for profile views.
    pub async fn load_user_tweets(&self, user_id: &str) {
        match self.inner.api.tweets(Some(user_id)).await {
            Ok(tweets) => self.commit(|state| state.tweets = tweets),
            Err(e) => {
                tracing::warn!("Failed to load tweets for {}: {}", user_id, e);
                self.commit(|state| state.tweets = Vec::new());
            }
        }
    }
}
