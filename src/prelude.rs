//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types from the twittlite library,
//! providing a convenient way to import the most frequently used items.
//!
//! # Usage
//!
//! ```ignore
//! use twittlite::prelude::*;
//! ```
//!
//! This will import:
//! - Store types (ClientStore, AppState, SocialStore, Subscription)
//! - Model types (User, Tweet, Notification, Theme)
//! - API clients and their request/response types
//! - Configuration and session storage

// Store types
pub use crate::store::{AppState, ClientStore, SocialStore, StoreError, Subscription};

// Model types
pub use crate::models::{
    Notification, NotificationKind, Retweet, Theme, Tweet, TweetVerification, User,
};

// API clients
pub use crate::api::{
    ApiClient, ApiError, AuthResponse, FollowResponse, LikeResponse, NewAccount, NewTweet, NewUser,
    RetweetResponse,
};
pub use crate::verification::{ChatHistory, ChatSession, VerificationClient, VerificationResult};

// Configuration and session storage
pub use crate::config::StoreConfig;
pub use crate::session::{
    SessionStore, StoredSession, INACTIVITY_LOGOUT_MESSAGE, INACTIVITY_TIMEOUT_MS,
};
