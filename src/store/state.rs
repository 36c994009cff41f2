use std::collections::HashMap;

use crate::models::{Notification, Theme, Tweet, User};

/// Snapshot of everything the UI renders.
///
/// Snapshots are immutable once published; the store replaces the whole
/// value on every committed change. Holds for every reachable snapshot:
/// `is_authenticated` is true exactly when both `current_user_id` and
/// `auth_token` are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// All known users, by id
    pub users: HashMap<String, User>,
    /// Id of the signed-in user
    pub current_user_id: Option<String>,
    /// Bearer token for the current session
    pub auth_token: Option<String>,
    /// Loaded tweets, newest first (global feed, or one user's after
    /// a profile load)
    pub tweets: Vec<Tweet>,
    /// Whether a user is signed in
    pub is_authenticated: bool,
    /// UI color theme
    pub theme: Theme,
    /// The signed-in user's notifications
    pub notifications: Vec<Notification>,
    /// Current contents of the search box
    pub search_query: String,
    /// Whether a blocking operation is in flight
    pub loading: bool,
    /// Message from the last failed operation, for display
    pub error: Option<String>,
    /// One-shot session notice (e.g. the inactivity logout message)
    pub auth_message: Option<String>,
    /// Last recorded user activity, milliseconds since the Unix epoch
    pub last_activity_at: Option<i64>,
}

impl AppState {
    /// The signed-in user's record, when it is present in the user cache.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user_id
            .as_deref()
            .and_then(|id| self.users.get(id))
    }

    /// Number of unread notifications in this snapshot.
    pub fn unread_notification_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}
