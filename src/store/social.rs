//! Follow toggle and the pure feed selectors.

use super::{ClientStore, StoreError};
use crate::models::Tweet;

impl ClientStore {
    /// Toggle following a user.
    ///
    /// Applies the server's `isFollowing` flag to both cached users' edge
    /// lists; the denormalized counts refresh with the next user load. The
    /// edges only update when both users are cached. Following yourself is
    /// a no-op.
    pub async fn toggle_follow(&self, user_id: &str) -> Result<(), StoreError> {
        let current_user_id = match self.state().current_user_id.clone() {
            Some(id) => id,
            None => return Err(StoreError::NotAuthenticated),
        };
        if current_user_id == user_id {
            return Ok(());
        }

        match self.inner.api.follow_user(user_id, &current_user_id).await {
            Ok(result) => {
                let snapshot = self.state();
                let both_cached = snapshot.users.contains_key(&current_user_id)
                    && snapshot.users.contains_key(user_id);
                if both_cached {
                    self.commit(|state| {
                        if let Some(me) = state.users.get_mut(&current_user_id) {
                            if result.is_following {
                                if !me.following.iter().any(|id| id == user_id) {
                                    me.following.push(user_id.to_string());
                                }
                            } else {
                                me.following.retain(|id| id != user_id);
                            }
                        }
                        if let Some(target) = state.users.get_mut(user_id) {
                            if result.is_following {
                                if !target.followers.iter().any(|id| id == &current_user_id) {
                                    target.followers.push(current_user_id.clone());
                                }
                            } else {
                                target.followers.retain(|id| id != &current_user_id);
                            }
                        }
                    });
                }
                self.load_notifications().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to toggle follow on {}: {}", user_id, e);
                Err(e.into())
            }
        }
    }

    /// Tweets authored by a user, in cache order.
    pub fn user_feed(&self, user_id: &str) -> Vec<Tweet> {
        self.state()
            .tweets
            .iter()
            .filter(|t| t.author.id == user_id)
            .cloned()
            .collect()
    }

    /// Tweets by a user and everyone they follow, newest first. Empty when
    /// the user is not cached.
    pub fn following_feed(&self, user_id: &str) -> Vec<Tweet> {
        let state = self.state();
        let user = match state.users.get(user_id) {
            Some(user) => user,
            None => return Vec::new(),
        };

        let mut feed: Vec<Tweet> = state
            .tweets
            .iter()
            .filter(|t| {
                t.author.id == user_id || user.following.iter().any(|id| id == &t.author.id)
            })
            .cloned()
            .collect();
        feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        feed
    }

    /// Tweets a user has liked.
    pub fn liked_tweets(&self, user_id: &str) -> Vec<Tweet> {
        self.state()
            .tweets
            .iter()
            .filter(|t| t.liked_by(user_id))
            .cloned()
            .collect()
    }

    /// Tweets a user has retweeted.
    pub fn retweeted_tweets(&self, user_id: &str) -> Vec<Tweet> {
        self.state()
            .tweets
            .iter()
            .filter(|t| t.retweeted_by(user_id))
            .cloned()
            .collect()
    }
}
