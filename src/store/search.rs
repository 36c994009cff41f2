//! Search passthroughs and the live query echo.

use super::ClientStore;
use crate::models::{Tweet, User};

impl ClientStore {
    /// Echo the search box contents into shared state.
    pub fn set_search_query(&self, query: &str) {
        let query = query.to_string();
        self.commit(|state| state.search_query = query);
    }

    /// Full-text tweet search. Results go to the caller, not the cache;
    /// failures degrade to an empty list.
    pub async fn search_tweets(&self, query: &str) -> Vec<Tweet> {
        match self.inner.api.search_tweets(query).await {
            Ok(tweets) => tweets,
            Err(e) => {
                tracing::warn!("Tweet search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// User search by handle or name. Failures degrade to an empty list.
    pub async fn search_users(&self, query: &str) -> Vec<User> {
        match self.inner.api.search_users(query).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!("User search failed: {}", e);
                Vec::new()
            }
        }
    }
}
