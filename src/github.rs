//! GitHub REST adapter — the concrete notification feed and session gate.
//!
//! Consumes exactly two endpoints: the notification listing and the
//! per-comment URLs the listing hands back. No other wire format is
//! owned here.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::error::{ConfigError, FeedError};
use crate::model::{Comment, NotificationThread};
use crate::ports::{NotificationFeed, SessionGate};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const APP_USER_AGENT: &str = concat!("octowatch/", env!("CARGO_PKG_VERSION"));
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// reqwest-backed notification feed.
pub struct GithubFeed {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl GithubFeed {
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Point the feed at a different API root (tests, GitHub Enterprise).
    pub fn with_base_url(token: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Build from `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("GITHUB_TOKEN".to_string()))?;
        Ok(Self::new(SecretString::from(token)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, GITHUB_MEDIA_TYPE)
            .header(reqwest::header::USER_AGENT, APP_USER_AGENT)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| FeedError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.json().await.map_err(|e| FeedError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl NotificationFeed for GithubFeed {
    async fn notifications(&self, page: u32) -> Result<Vec<NotificationThread>, FeedError> {
        let url = format!("{}/notifications?page={}", self.base_url, page);
        self.get_json(&url).await
    }

    async fn comment(&self, url: &str) -> Result<Comment, FeedError> {
        self.get_json(url).await
    }
}

/// Session gate backed by token presence.
pub struct GithubSession {
    token: Option<SecretString>,
}

impl GithubSession {
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }

    /// Read `GITHUB_TOKEN`, treating an unset or empty variable as
    /// signed out.
    pub fn from_env() -> Self {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        Self { token }
    }
}

#[async_trait]
impl SessionGate for GithubSession {
    async fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
