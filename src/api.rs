//! HTTP client for the main Twittlite backend.
//!
//! This module provides the typed client for users, tweets, notifications,
//! account auth, and image upload. Fact-checking and chat live on a separate
//! backend; see [`crate::verification`] for that client.

use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Notification, Tweet, User};

/// Default URL for the main backend API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Error type for backend API operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error status
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Upload answered with something that is not a usable image URL
    #[error("invalid image URL: {0}")]
    InvalidImageUrl(String),
}

impl ApiError {
    /// Whether the server answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Server { status: 404, .. })
    }

    /// The server's own error text, when the server produced one.
    ///
    /// Backends answer errors as `{"error": "..."}` or `{"message": "..."}`;
    /// that text is extracted verbatim so it can be shown to the user.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Extract a display message from an error response body.
///
/// Prefers the JSON `error` field, then `message`, then the raw body text.
fn error_message_from_body(status: u16, body: &str) -> String {
    if body.is_empty() {
        return format!("HTTP error! status: {}", status);
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json
            .get("error")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .or_else(|| json.get("message").and_then(|v| v.as_str()).filter(|s| !s.is_empty()))
            .map(|s| s.to_string())
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Check the status, extracting the server's error text on failure.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Server {
        status: status.as_u16(),
        message: error_message_from_body(status.as_u16(), &body),
    })
}

/// Read a JSON response body, extracting the server's error text on failure.
///
/// Shared with the verification client, which talks to a different backend
/// but answers errors in the same shape.
pub(crate) async fn read_json_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Turn the upload endpoint's `imageUrl` into an absolute URL.
///
/// The server may answer with a relative `/api/image/...` path, which is
/// resolved against the API host. Inline `data:` payloads and anything else
/// that does not end up an absolute http(s) URL are rejected.
fn normalize_image_url(base_url: &str, image_url: &str) -> Result<String, ApiError> {
    if image_url.is_empty() || image_url.starts_with("data:") {
        return Err(ApiError::InvalidImageUrl(
            "expected a URL, got inline image data".to_string(),
        ));
    }

    let absolute = if image_url.starts_with("/api/image/") {
        let host = base_url.replacen("/api", "", 1);
        format!("{}{}", host, image_url)
    } else {
        image_url.to_string()
    };

    if !absolute.starts_with("http://") && !absolute.starts_with("https://") {
        return Err(ApiError::InvalidImageUrl(absolute));
    }

    Ok(absolute)
}

/// Payload for creating a user directly (POST /users).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub handle: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Payload for registering an account (POST /auth/register).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Payload for posting a tweet (POST /tweets).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTweet {
    /// Id of the posting user
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Set by the reply endpoint, not by callers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_tweet: Option<String>,
}

/// Response from the auth endpoints (POST /auth/register, POST /auth/login).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// The authenticated user's record
    pub user: User,
}

/// Response from the like toggle (POST /tweets/:id/like).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// Whether the user likes the tweet after the toggle
    pub is_liked: bool,
    /// Authoritative like total after the toggle
    pub like_count: i64,
}

/// Response from the retweet toggle (POST /tweets/:id/retweet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetweetResponse {
    /// Whether the user has the tweet retweeted after the toggle
    pub is_retweeted: bool,
    /// Authoritative retweet total after the toggle
    pub retweet_count: i64,
}

/// Response from the follow toggle (POST /users/:id/follow).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    /// Whether the current user follows the target after the toggle
    pub is_following: bool,
}

/// Response from the unread counter (GET /notifications/:userId/unread-count).
#[derive(Debug, Clone, Deserialize)]
struct UnreadCountResponse {
    count: i64,
}

/// Response from the image upload (POST /upload/image).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadImageResponse {
    #[serde(default)]
    image_url: Option<String>,
}

/// Client for the main Twittlite backend.
pub struct ApiClient {
    /// Base URL for the backend API, including the `/api` prefix
    pub base_url: String,
    /// Reusable HTTP client
    client: Client,
    /// Bearer token attached to requests once the user has logged in
    auth_token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a new ApiClient with the default base URL.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL.to_string())
    }

    /// Create a new ApiClient with a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
            auth_token: RwLock::new(None),
        }
    }

    /// Set the authentication token at construction time.
    pub fn with_auth(self, token: &str) -> Self {
        *self.auth_token.write() = Some(token.to_string());
        self
    }

    /// Set or clear the authentication token on an existing client.
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write() = token;
    }

    /// Get the current authentication token, if set.
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token.read().clone()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Helper to add auth header to a request builder if a token is set.
    fn add_auth_header(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = *self.auth_token.read() {
            builder.header("Authorization", format!("Bearer {}", token))
        } else {
            builder
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let builder = self.client.get(self.url(endpoint));
        let response = self.add_auth_header(builder).send().await?;
        read_json_response(response).await
    }

    async fn post_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.client.post(self.url(endpoint)).json(body);
        let response = self.add_auth_header(builder).send().await?;
        read_json_response(response).await
    }

    /// PUT with an empty body, ignoring the response payload.
    async fn put_ok(&self, endpoint: &str) -> Result<(), ApiError> {
        let builder = self.client.put(self.url(endpoint));
        let response = self.add_auth_header(builder).send().await?;
        ensure_success(response).await.map(|_| ())
    }

    // --- User endpoints ---

    /// Fetch all users.
    ///
    /// GET /users
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/users").await
    }

    /// Fetch a single user by id.
    ///
    /// GET /users/:id
    pub async fn user(&self, user_id: &str) -> Result<User, ApiError> {
        self.get_json(&format!("/users/{}", user_id)).await
    }

    /// Create a user without going through account registration.
    ///
    /// POST /users
    pub async fn create_user(&self, new_user: &NewUser) -> Result<User, ApiError> {
        self.post_json("/users", new_user).await
    }

    /// Toggle whether `current_user_id` follows `user_id`.
    ///
    /// POST /users/:id/follow
    ///
    /// The server decides the direction of the toggle and answers with the
    /// resulting follow state.
    pub async fn follow_user(
        &self,
        user_id: &str,
        current_user_id: &str,
    ) -> Result<FollowResponse, ApiError> {
        let body = serde_json::json!({ "currentUserId": current_user_id });
        self.post_json(&format!("/users/{}/follow", user_id), &body)
            .await
    }

    /// Search users by handle or name.
    ///
    /// GET /users/search/:query
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, ApiError> {
        self.get_json(&format!("/users/search/{}", urlencoding::encode(query)))
            .await
    }

    // --- Tweet endpoints ---

    /// Fetch the global feed, or one user's tweets when `user_id` is given.
    ///
    /// GET /tweets or GET /tweets?userId=:id
    pub async fn tweets(&self, user_id: Option<&str>) -> Result<Vec<Tweet>, ApiError> {
        let endpoint = match user_id {
            Some(id) => format!("/tweets?userId={}", id),
            None => "/tweets".to_string(),
        };
        self.get_json(&endpoint).await
    }

    /// Fetch a single tweet by id.
    ///
    /// GET /tweets/:id
    pub async fn tweet(&self, tweet_id: &str) -> Result<Tweet, ApiError> {
        self.get_json(&format!("/tweets/{}", tweet_id)).await
    }

    /// Post a new tweet.
    ///
    /// POST /tweets
    ///
    /// Returns the created tweet with its author populated.
    pub async fn create_tweet(&self, new_tweet: &NewTweet) -> Result<Tweet, ApiError> {
        self.post_json("/tweets", new_tweet).await
    }

    /// Toggle a like on a tweet.
    ///
    /// POST /tweets/:id/like
    ///
    /// The server decides the direction of the toggle and answers with the
    /// resulting like state and authoritative count.
    pub async fn like_tweet(
        &self,
        tweet_id: &str,
        user_id: &str,
        user_name: &str,
    ) -> Result<LikeResponse, ApiError> {
        let body = serde_json::json!({ "userId": user_id, "userName": user_name });
        self.post_json(&format!("/tweets/{}/like", tweet_id), &body)
            .await
    }

    /// Toggle a retweet on a tweet.
    ///
    /// POST /tweets/:id/retweet
    pub async fn retweet(
        &self,
        tweet_id: &str,
        user_id: &str,
        user_name: &str,
    ) -> Result<RetweetResponse, ApiError> {
        let body = serde_json::json!({ "userId": user_id, "userName": user_name });
        self.post_json(&format!("/tweets/{}/retweet", tweet_id), &body)
            .await
    }

    /// Post a reply to a tweet.
    ///
    /// POST /tweets/:id/reply
    ///
    /// Returns the created reply tweet.
    pub async fn reply_to_tweet(
        &self,
        tweet_id: &str,
        author: &str,
        content: &str,
        user_name: &str,
    ) -> Result<Tweet, ApiError> {
        let body = serde_json::json!({
            "author": author,
            "content": content,
            "userName": user_name,
        });
        self.post_json(&format!("/tweets/{}/reply", tweet_id), &body)
            .await
    }

    /// Search tweets by content.
    ///
    /// GET /tweets/search/:query
    pub async fn search_tweets(&self, query: &str) -> Result<Vec<Tweet>, ApiError> {
        self.get_json(&format!("/tweets/search/{}", urlencoding::encode(query)))
            .await
    }

    /// Delete a tweet. Only the author may delete; the server enforces this.
    ///
    /// DELETE /tweets/:id
    pub async fn delete_tweet(&self, tweet_id: &str, user_id: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "userId": user_id });
        let builder = self
            .client
            .delete(self.url(&format!("/tweets/{}", tweet_id)))
            .json(&body);
        let response = self.add_auth_header(builder).send().await?;
        ensure_success(response).await.map(|_| ())
    }

    // --- Notification endpoints ---

    /// Fetch a user's notifications, newest first.
    ///
    /// GET /notifications/:userId
    pub async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        self.get_json(&format!("/notifications/{}", user_id)).await
    }

    /// Mark one notification as read.
    ///
    /// PUT /notifications/:id/read
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.put_ok(&format!("/notifications/{}/read", notification_id))
            .await
    }

    /// Mark all of a user's notifications as read.
    ///
    /// PUT /notifications/:userId/read-all
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<(), ApiError> {
        self.put_ok(&format!("/notifications/{}/read-all", user_id))
            .await
    }

    /// Fetch the number of unread notifications for a user.
    ///
    /// GET /notifications/:userId/unread-count
    pub async fn unread_notification_count(&self, user_id: &str) -> Result<i64, ApiError> {
        let response: UnreadCountResponse = self
            .get_json(&format!("/notifications/{}/unread-count", user_id))
            .await?;
        Ok(response.count)
    }

    // --- Auth endpoints ---

    /// Register a new account.
    ///
    /// POST /auth/register
    ///
    /// Returns the bearer token and the created user.
    pub async fn register(&self, new_account: &NewAccount) -> Result<AuthResponse, ApiError> {
        self.post_json("/auth/register", new_account).await
    }

    /// Log in with handle and password.
    ///
    /// POST /auth/login
    pub async fn login(&self, handle: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "handle": handle, "password": password });
        self.post_json("/auth/login", &body).await
    }

    // --- Misc endpoints ---

    /// Check whether the backend is reachable and healthy.
    ///
    /// GET /health
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Ok(response.status().is_success())
    }

    /// Upload an image and get back its absolute URL.
    ///
    /// POST /upload/image (multipart, field name `image`)
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let builder = self.client.post(self.url("/upload/image")).multipart(form);
        let response = self.add_auth_header(builder).send().await?;
        let upload: UploadImageResponse = read_json_response(response).await?;

        normalize_image_url(&self.base_url, upload.image_url.as_deref().unwrap_or_default())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
