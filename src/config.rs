//! Client configuration.
//!
//! This module defines where the store finds its two backends and its
//! session file. Use the builder methods to customize, or read overrides
//! from the environment.

use std::path::PathBuf;

use crate::api::DEFAULT_API_BASE_URL;
use crate::verification::DEFAULT_VERIFICATION_BASE_URL;

/// Environment variable overriding the main API base URL.
pub const API_BASE_URL_ENV: &str = "TWITTLITE_API_BASE_URL";

/// Environment variable overriding the verification API base URL.
pub const VERIFICATION_BASE_URL_ENV: &str = "TWITTLITE_VERIFICATION_BASE_URL";

/// Configuration for building a [`crate::store::ClientStore`].
///
/// # Example
///
/// ```ignore
/// use twittlite::config::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_api_base_url("http://localhost:3001/api")
///     .with_session_path("/tmp/twittlite-session.json");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL for the main backend API, including the `/api` prefix
    pub api_base_url: String,
    /// Base URL for the verification/chatbot backend API
    pub verification_base_url: String,
    /// Session file override. `None` means `~/.twittlite/session.json`.
    pub session_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            verification_base_url: DEFAULT_VERIFICATION_BASE_URL.to_string(),
            session_path: None,
        }
    }
}

impl StoreConfig {
    /// Create a new StoreConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the main API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the verification API base URL.
    pub fn with_verification_base_url(mut self, url: impl Into<String>) -> Self {
        self.verification_base_url = url.into();
        self
    }

    /// Set an explicit session file path.
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Create config from the environment.
    ///
    /// `TWITTLITE_API_BASE_URL` and `TWITTLITE_VERIFICATION_BASE_URL`
    /// override the defaults when set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }
        if let Ok(url) = std::env::var(VERIFICATION_BASE_URL_ENV) {
            if !url.is_empty() {
                config.verification_base_url = url;
            }
        }
        config
    }
}
