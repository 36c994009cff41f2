//! Client for the verification and chatbot backend.
//!
//! Fact-checking and the chat assistant are served by a separate backend from
//! the main API. This client covers tweet verification, one-shot chatbot
//! queries, and persistent chat sessions.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::config::StoreConfig;

/// Default URL for the verification backend API
pub const DEFAULT_VERIFICATION_BASE_URL: &str = "http://localhost:3000/api";

/// Result of a fact-check run against tweet content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationResult {
    /// Verdict label (e.g. "true", "false", "misleading")
    pub verdict: String,
    /// Confidence score between 0 and 1
    #[serde(default)]
    pub confidence: f64,
    /// Explanation for the verdict
    #[serde(default)]
    pub reason: String,
    /// Self-awareness note, when the checker flagged its own limits
    #[serde(default)]
    pub awareness_factor: Option<String>,
}

/// Response from the chat session endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Server acknowledgement text
    #[serde(default)]
    pub message: String,
    /// Id for subsequent messages in this session
    pub chat_id: String,
}

/// Response from the chat history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    #[serde(default)]
    pub message: String,
    pub chat_id: String,
    /// Prior exchanges, in the server's own shape
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// Plain-text answer wrapper used by the chatbot endpoints.
#[derive(Debug, Clone, Deserialize)]
struct ChatbotResponse {
    response: String,
}

/// Payload for the tweet-context chatbot (POST /chatbot/tweet).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct TweetChatQuery<'a> {
    query: &'a str,
    tweet_content: &'a str,
    verification_result: &'a VerificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    tweet_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

/// Payload for the fact-check endpoint (POST /verify). `tweetId` is always
/// sent, empty for unposted drafts; `imageUrl` is dropped when absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    tweet_id: &'a str,
    content: &'a str,
    username: &'a str,
    social_media_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

/// Unwrap the `/verify` payload into a verification result.
///
/// The route normally wraps the result as `{"response": {...}}`, but some
/// deployments answer with the result object directly. Anything else counts
/// as "no result".
fn extract_verification(value: serde_json::Value) -> Result<Option<VerificationResult>, ApiError> {
    if let Some(inner) = value.get("response") {
        if inner.is_object() {
            return Ok(Some(serde_json::from_value(inner.clone())?));
        }
    }
    if value.get("verdict").is_some() {
        return Ok(Some(serde_json::from_value(value)?));
    }
    Ok(None)
}

/// Client for the verification and chatbot backend.
pub struct VerificationClient {
    /// Base URL for the verification API, including the `/api` prefix
    pub base_url: String,
    /// Reusable HTTP client
    client: Client,
}

impl VerificationClient {
    /// Create a new VerificationClient with the default base URL.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_VERIFICATION_BASE_URL.to_string())
    }

    /// Create a new VerificationClient with a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Create a VerificationClient pointed at the configured backend.
    ///
    /// Picks up `verification_base_url`, so environment overrides read by
    /// [`StoreConfig::from_env`] apply here too.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_base_url(config.verification_base_url.clone())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn post_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.client.post(self.url(endpoint)).json(body).send().await?;
        crate::api::read_json_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self.client.get(self.url(endpoint)).send().await?;
        crate::api::read_json_response(response).await
    }

    /// Run a fact-check on tweet content.
    ///
    /// POST /verify
    ///
    /// Returns `None` when the service answers without a usable result.
    pub async fn verify_tweet(
        &self,
        tweet_id: Option<&str>,
        content: &str,
        username: &str,
        social_media_type: &str,
        image_url: Option<&str>,
    ) -> Result<Option<VerificationResult>, ApiError> {
        let body = VerifyRequest {
            tweet_id: tweet_id.unwrap_or(""),
            content,
            username,
            social_media_type,
            image_url,
        };
        let value: serde_json::Value = self.post_json("/verify", &body).await?;
        extract_verification(value)
    }

    /// Ask the general chatbot a one-shot question.
    ///
    /// POST /chatbot
    pub async fn chatbot_query(&self, query: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "query": query });
        let answer: ChatbotResponse = self.post_json("/chatbot", &body).await?;
        Ok(answer.response)
    }

    /// Ask the chatbot about a specific tweet and its fact-check.
    ///
    /// POST /chatbot/tweet
    pub async fn tweet_chatbot_query(
        &self,
        query: &str,
        tweet_content: &str,
        verification_result: &VerificationResult,
        tweet_id: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<String, ApiError> {
        let body = TweetChatQuery {
            query,
            tweet_content,
            verification_result,
            tweet_id,
            image_url,
        };
        let answer: ChatbotResponse = self.post_json("/chatbot/tweet", &body).await?;
        Ok(answer.response)
    }

    /// Open a persistent chat session.
    ///
    /// POST /chat/session
    pub async fn create_chat_session(
        &self,
        user_name: &str,
        platform_id: i64,
    ) -> Result<ChatSession, ApiError> {
        let body = serde_json::json!({ "userName": user_name, "platformId": platform_id });
        self.post_json("/chat/session", &body).await
    }

    /// Send a message within a chat session.
    ///
    /// POST /chat/send
    pub async fn send_chat_message(
        &self,
        chat_id: &str,
        user_name: &str,
        platform_id: i64,
        query: &str,
    ) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "chatId": chat_id,
            "userName": user_name,
            "platformId": platform_id,
            "query": query,
        });
        let answer: ChatbotResponse = self.post_json("/chat/send", &body).await?;
        Ok(answer.response)
    }

    /// Fetch the message history of a chat session.
    ///
    /// GET /chat/history/:chatId
    pub async fn chat_history(&self, chat_id: &str) -> Result<ChatHistory, ApiError> {
        self.get_json(&format!("/chat/history/{}", chat_id)).await
    }
}

impl Default for VerificationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verification_client_new() {
        let client = VerificationClient::new();
        assert_eq!(client.base_url, DEFAULT_VERIFICATION_BASE_URL);
    }

    #[test]
    fn test_from_config_uses_configured_base_url() {
        let config =
            StoreConfig::default().with_verification_base_url("http://verify.test:9000/api");
        let client = VerificationClient::from_config(&config);
        assert_eq!(client.base_url, "http://verify.test:9000/api");
    }

    #[test]
    fn test_extract_verification_from_envelope() {
        let value = json!({
            "response": {
                "verdict": "misleading",
                "confidence": 0.72,
                "reason": "Partially out of context",
                "awareness_factor": "satire possible"
            }
        });
        let result = extract_verification(value).unwrap().unwrap();
        assert_eq!(result.verdict, "misleading");
        assert_eq!(result.awareness_factor.as_deref(), Some("satire possible"));
    }

    #[test]
    fn test_extract_verification_from_direct_result() {
        let value = json!({ "verdict": "true", "confidence": 0.9, "reason": "checks out" });
        let result = extract_verification(value).unwrap().unwrap();
        assert_eq!(result.verdict, "true");
        assert!((result.confidence - 0.9).abs() < f64::EPSILON);
        assert!(result.awareness_factor.is_none());
    }

    #[test]
    fn test_extract_verification_without_result_is_none() {
        assert_eq!(extract_verification(json!({ "status": "queued" })).unwrap(), None);
        assert_eq!(extract_verification(json!({ "response": "working on it" })).unwrap(), None);
    }

    #[test]
    fn test_verify_request_omits_absent_image() {
        let body = VerifyRequest {
            tweet_id: "",
            content: "the moon is cheese",
            username: "ada",
            social_media_type: "twittlite",
            image_url: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("imageUrl").is_none());
        assert_eq!(json["tweetId"], json!(""));
        assert_eq!(json["socialMediaType"], json!("twittlite"));
    }

    #[test]
    fn test_tweet_chat_query_omits_absent_fields() {
        let result = VerificationResult {
            verdict: "false".to_string(),
            confidence: 0.8,
            reason: "nope".to_string(),
            awareness_factor: None,
        };
        let body = TweetChatQuery {
            query: "why?",
            tweet_content: "the earth is flat",
            verification_result: &result,
            tweet_id: None,
            image_url: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("tweetId").is_none());
        assert!(json.get("imageUrl").is_none());
        assert_eq!(json["tweetContent"], json!("the earth is flat"));
        assert_eq!(json["verificationResult"]["verdict"], json!("false"));
    }

    #[tokio::test]
    async fn test_chatbot_query_with_unreachable_server() {
        let client = VerificationClient::with_base_url("http://127.0.0.1:1/api".to_string());
        let result = client.chatbot_query("hello").await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
