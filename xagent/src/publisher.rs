//! Publishing the composed text: the `Publisher` trait, the Twitter v2 client and a dry-run
//! publisher.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Twitter's limit, counted in characters.
pub const MAX_TWEET_CHARS: usize = 280;

const TWITTER_TWEETS_URL: &str = "https://api.twitter.com/2/tweets";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publisher not configured: {0}")]
    NotConfigured(String),
    #[error("text is {len} characters, limit is {max}")]
    TooLong { len: usize, max: usize },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rejected by server: {0}")]
    Rejected(String),
}

/// Posts text somewhere and returns the id of the created post.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn post(&self, text: &str) -> Result<String, PublishError>;
}

/// Posts through the Twitter API v2 with an OAuth 2.0 user bearer token.
pub struct TwitterPublisher {
    bearer_token: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CreatedTweet {
    data: CreatedTweetData,
}

#[derive(Deserialize)]
struct CreatedTweetData {
    id: String,
}

impl TwitterPublisher {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            endpoint: TWITTER_TWEETS_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Token from config; `NotConfigured` when absent.
    pub fn from_token(token: Option<&str>) -> Result<Self, PublishError> {
        match token.filter(|t| !t.is_empty()) {
            Some(t) => Ok(Self::new(t)),
            None => Err(PublishError::NotConfigured(
                "TWITTER_BEARER_TOKEN is not set".to_string(),
            )),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Rejects texts over [`MAX_TWEET_CHARS`].
pub fn check_length(text: &str) -> Result<(), PublishError> {
    let len = text.chars().count();
    if len > MAX_TWEET_CHARS {
        return Err(PublishError::TooLong {
            len,
            max: MAX_TWEET_CHARS,
        });
    }
    Ok(())
}

#[async_trait]
impl Publisher for TwitterPublisher {
    async fn post(&self, text: &str) -> Result<String, PublishError> {
        check_length(text)?;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.bearer_token)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected(format!("{}: {}", status, body)));
        }
        let created: CreatedTweet = response
            .json()
            .await
            .map_err(|e| PublishError::Rejected(format!("unexpected response body: {}", e)))?;
        tracing::info!(tweet_id = %created.data.id, "tweet posted");
        Ok(created.data.id)
    }
}

/// Logs the text instead of posting it. No length limit applies.
#[derive(Debug, Default, Clone)]
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn post(&self, text: &str) -> Result<String, PublishError> {
        let id = format!("dry-run-{}", Uuid::new_v4());
        tracing::info!(id = %id, chars = text.chars().count(), %text, "dry run: not posting");
        Ok(id)
    }
}

/// Posts under a deadline. Any failure comes back as the in-band string
/// `"[Error] Failed to post: {reason}"`.
pub async fn publish_with_timeout(
    publisher: &dyn Publisher,
    text: &str,
    timeout: Duration,
) -> Result<String, String> {
    let reason = match tokio::time::timeout(timeout, publisher.post(text)).await {
        Ok(Ok(id)) => return Ok(id),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {}s", timeout.as_secs_f64()),
    };
    tracing::error!(%reason, "publish failed");
    Err(format!("[Error] Failed to post: {}", reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hanging;

    #[async_trait]
    impl Publisher for Hanging {
        async fn post(&self, _text: &str) -> Result<String, PublishError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("never".into())
        }
    }

    /// **Scenario**: Dry run returns a dry-run id and never touches the network.
    #[tokio::test]
    async fn dry_run_returns_id() {
        let id = DryRunPublisher.post("hello").await.unwrap();
        assert!(id.starts_with("dry-run-"), "{}", id);
    }

    /// **Scenario**: 280 characters pass, 281 are rejected; CJK counts per character.
    #[test]
    fn length_limit_counts_chars() {
        assert!(check_length(&"天".repeat(280)).is_ok());
        assert!(matches!(
            check_length(&"a".repeat(281)),
            Err(PublishError::TooLong { len: 281, max: 280 })
        ));
    }

    /// **Scenario**: Missing token is NotConfigured.
    #[test]
    fn twitter_requires_token() {
        assert!(matches!(
            TwitterPublisher::from_token(None),
            Err(PublishError::NotConfigured(_))
        ));
        assert!(TwitterPublisher::from_token(Some("t")).is_ok());
    }

    /// **Scenario**: A hanging publisher turns into the tagged error string.
    #[tokio::test]
    async fn timeout_is_tagged_error() {
        let err = publish_with_timeout(&Hanging, "x", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(err.starts_with("[Error] Failed to post: timed out"), "{}", err);
    }

    /// **Scenario**: Dry run accepts text over the post limit.
    #[tokio::test]
    async fn dry_run_ignores_length_limit() {
        let id = publish_with_timeout(&DryRunPublisher, &"a".repeat(425), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(id.starts_with("dry-run-"), "{}", id);
    }

    /// **Scenario**: Twitter rejects a too-long text before any request; reported in-band.
    #[tokio::test]
    async fn too_long_is_tagged_error() {
        let twitter = TwitterPublisher::new("t").with_endpoint("http://127.0.0.1:9/2/tweets");
        let err = publish_with_timeout(&twitter, &"a".repeat(300), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            "[Error] Failed to post: text is 300 characters, limit is 280"
        );
    }
}
