use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (Mongo-style `_id`)
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Unique @handle, without the leading `@`
    pub handle: String,
    /// Display name
    pub name: String,
    /// Avatar image URL, if one was uploaded
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Profile bio text
    #[serde(default)]
    pub bio: Option<String>,
    /// Ids of users following this user
    #[serde(default)]
    pub followers: Vec<String>,
    /// Ids of users this user follows
    #[serde(default)]
    pub following: Vec<String>,
    /// Denormalized follower total maintained by the server
    #[serde(default)]
    pub follower_count: i64,
    /// Denormalized following total maintained by the server
    #[serde(default)]
    pub following_count: i64,
    /// When the account was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// A retweet entry embedded in a tweet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Retweet {
    /// Id of the user who retweeted
    pub user: String,
    /// When the retweet happened
    #[serde(default = "Utc::now")]
    pub retweeted_at: DateTime<Utc>,
}

/// Automated fact-check attached to a tweet by the verification service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TweetVerification {
    /// Verdict label (e.g. "true", "false", "misleading")
    pub verdict: String,
    /// Confidence score for the verdict
    #[serde(default)]
    pub confidence: f64,
    /// Explanation for the verdict
    #[serde(default)]
    pub reason: String,
    /// Self-awareness note, when the checker flagged its own limits
    #[serde(default, rename = "awareness_factor")]
    pub awareness_factor: Option<String>,
    /// When the check ran
    #[serde(default = "Utc::now")]
    pub verified_at: DateTime<Utc>,
    /// Which checker produced the verdict
    #[serde(default)]
    pub verified_by: String,
}

/// A tweet with its author populated by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    /// Unique identifier (Mongo-style `_id`)
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Full author record (the server populates the reference)
    pub author: User,
    /// Body text
    pub content: String,
    /// Attached image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Id of the tweet this one replies to, for reply tweets
    #[serde(default)]
    pub parent_tweet: Option<String>,
    /// Ids of users who liked this tweet
    #[serde(default)]
    pub likes: Vec<String>,
    /// Users who retweeted, with timestamps
    #[serde(default)]
    pub retweets: Vec<Retweet>,
    /// Ids of reply tweets
    #[serde(default)]
    pub replies: Vec<String>,
    /// Denormalized like total maintained by the server
    #[serde(default)]
    pub like_count: i64,
    /// Denormalized retweet total maintained by the server
    #[serde(default)]
    pub retweet_count: i64,
    /// Denormalized reply total maintained by the server
    #[serde(default)]
    pub reply_count: i64,
    /// When the tweet was posted
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Fact-check result, when the verification service has run
    #[serde(default)]
    pub verification: Option<TweetVerification>,
}

impl Tweet {
    /// Whether the given user has liked this tweet
    pub fn liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    /// Whether the given user has retweeted this tweet
    pub fn retweeted_by(&self, user_id: &str) -> bool {
        self.retweets.iter().any(|r| r.user == user_id)
    }
}

/// What kind of activity produced a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Retweet,
    Follow,
    Reply,
}

/// UI color theme, persisted across sessions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// An activity notification addressed to a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique identifier (Mongo-style `_id`)
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Id of the recipient
    pub user: String,
    /// Full record of the user whose action triggered this
    pub from_user: User,
    /// Activity kind
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Id of the tweet involved, when the activity concerns one
    #[serde(default)]
    pub tweet: Option<String>,
    /// Pre-rendered message text from the server
    #[serde(default)]
    pub message: String,
    /// Whether the recipient has seen it
    #[serde(default)]
    pub read: bool,
    /// When the activity happened
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
