//! Tweet mutations: compose, reply, delete, and the like/retweet toggles.
//!
//! Toggles are confirm-then-apply: the backend call goes out first and the
//! cache takes the boolean and count the server reports, so a stale local
//! flag cannot drift the cache.

use chrono::Utc;

use super::{ClientStore, StoreError};
use crate::api::NewTweet;
use crate::models::Retweet;

impl ClientStore {
    /// Post a new tweet and prepend it to the cache.
    pub async fn add_tweet(
        &self,
        content: &str,
        image_url: Option<String>,
    ) -> Result<(), StoreError> {
        let author = match self.state().current_user_id.clone() {
            Some(id) => id,
            None => return Err(StoreError::NotAuthenticated),
        };

        self.commit(|state| {
            state.loading = true;
            state.error = None;
        });

        let new_tweet = NewTweet {
            author,
            content: content.to_string(),
            image_url,
            parent_tweet: None,
        };
        match self.inner.api.create_tweet(&new_tweet).await {
            Ok(tweet) => {
                self.commit(|state| state.tweets.insert(0, tweet));
                self.load_notifications().await;
                self.commit(|state| state.loading = false);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to create tweet: {}", e);
                self.commit(|state| {
                    state.error = Some("Failed to create tweet".to_string());
                    state.loading = false;
                });
                Err(e.into())
            }
        }
    }

    /// Reply to a tweet. The reply is itself a tweet and lands at the top
    /// of the cache; the parent's reply count refreshes with the next load.
    pub async fn add_reply(&self, parent_id: &str, content: &str) -> Result<(), StoreError> {
        let (user_id, user_name) = match self.state().current_user() {
            Some(user) => (user.id.clone(), user.name.clone()),
            None => return Err(StoreError::NotAuthenticated),
        };

        self.commit(|state| {
            state.loading = true;
            state.error = None;
        });

        match self
            .inner
            .api
            .reply_to_tweet(parent_id, &user_id, content, &user_name)
            .await
        {
            Ok(reply) => {
                self.commit(|state| state.tweets.insert(0, reply));
                self.load_notifications().await;
                self.commit(|state| state.loading = false);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to create reply to {}: {}", parent_id, e);
                self.commit(|state| {
                    state.error = Some("Failed to create reply".to_string());
                    state.loading = false;
                });
                Err(e.into())
            }
        }
    }

    /// Delete one of the signed-in user's tweets and drop it from the cache.
    pub async fn delete_tweet(&self, tweet_id: &str) -> Result<(), StoreError> {
        let user_id = match self.state().current_user_id.clone() {
            Some(id) => id,
            None => return Err(StoreError::NotAuthenticated),
        };

        self.commit(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.inner.api.delete_tweet(tweet_id, &user_id).await {
            Ok(()) => {
                self.commit(|state| state.tweets.retain(|t| t.id != tweet_id));
                self.load_notifications().await;
                self.commit(|state| state.loading = false);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to delete tweet {}: {}", tweet_id, e);
                self.commit(|state| {
                    state.error = Some("Failed to delete tweet".to_string());
                    state.loading = false;
                });
                Err(e.into())
            }
        }
    }

    /// Toggle the signed-in user's like on a tweet.
    ///
    /// The cached tweet takes the `isLiked` flag and `likeCount` the server
    /// reports. On error the cache is left untouched.
    pub async fn toggle_like(&self, tweet_id: &str) -> Result<(), StoreError> {
        let (user_id, user_name) = match self.state().current_user() {
            Some(user) => (user.id.clone(), user.name.clone()),
            None => return Err(StoreError::NotAuthenticated),
        };

        match self
            .inner
            .api
            .like_tweet(tweet_id, &user_id, &user_name)
            .await
        {
            Ok(result) => {
                self.commit(|state| {
                    if let Some(tweet) = state.tweets.iter_mut().find(|t| t.id == tweet_id) {
                        tweet.like_count = result.like_count;
                        if result.is_liked {
                            if !tweet.likes.iter().any(|id| id == &user_id) {
                                tweet.likes.push(user_id.clone());
                            }
                        } else {
                            tweet.likes.retain(|id| id != &user_id);
                        }
                    }
                });
                self.load_notifications().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to toggle like on {}: {}", tweet_id, e);
                Err(e.into())
            }
        }
    }

    /// Toggle the signed-in user's retweet on a tweet.
    pub async fn toggle_retweet(&self, tweet_id: &str) -> Result<(), StoreError> {
        let (user_id, user_name) = match self.state().current_user() {
            Some(user) => (user.id.clone(), user.name.clone()),
            None => return Err(StoreError::NotAuthenticated),
        };

        match self.inner.api.retweet(tweet_id, &user_id, &user_name).await {
            Ok(result) => {
                self.commit(|state| {
                    if let Some(tweet) = state.tweets.iter_mut().find(|t| t.id == tweet_id) {
                        tweet.retweet_count = result.retweet_count;
                        if result.is_retweeted {
                            if !tweet.retweets.iter().any(|r| r.user == user_id) {
                                tweet.retweets.push(Retweet {
                                    user: user_id.clone(),
                                    retweeted_at: Utc::now(),
                                });
                            }
                        } else {
                            tweet.retweets.retain(|r| r.user != user_id);
                        }
                    }
                });
                self.load_notifications().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to toggle retweet on {}: {}", tweet_id, e);
                Err(e.into())
            }
        }
    }
}
