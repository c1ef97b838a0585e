//! Draw handler: turns a `draw` subtask into an image reference.
//!
//! Without a backend the reference is derived from a SHA-256 of the description, so the same
//! description always gives the same reference.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::plan::SubTask;

pub const DEFAULT_DRAW_BASE_URL: &str = "http://fakeimg.com";

const HASH_PREFIX_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    pub id: String,
    pub image_ref: String,
}

/// `{base_url}/{first 16 hex chars of sha256(description)}.png`.
pub fn image_ref(base_url: &str, description: &str) -> String {
    let digest = Sha256::digest(description.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}/{}.png",
        base_url.trim_end_matches('/'),
        &hex[..HASH_PREFIX_LEN]
    )
}

/// Real image backend; returns the URL of the generated image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, String>;
}

#[derive(Clone)]
pub struct DrawHandler {
    base_url: String,
    generator: Option<Arc<dyn ImageGenerator>>,
    timeout: Duration,
}

impl DrawHandler {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            generator: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn ImageGenerator>, timeout: Duration) -> Self {
        self.generator = Some(generator);
        self.timeout = timeout;
        self
    }

    pub async fn resolve(&self, subtask: &SubTask) -> DrawResult {
        let fallback = || image_ref(&self.base_url, &subtask.description);
        let image_ref = match &self.generator {
            None => fallback(),
            Some(generator) => {
                match tokio::time::timeout(self.timeout, generator.generate(&subtask.description))
                    .await
                {
                    Ok(Ok(url)) => url,
                    Ok(Err(e)) => {
                        tracing::warn!(subtask_id = %subtask.id, error = %e, "image backend failed, using hash reference");
                        fallback()
                    }
                    Err(_) => {
                        tracing::warn!(subtask_id = %subtask.id, timeout = ?self.timeout, "image backend timed out, using hash reference");
                        fallback()
                    }
                }
            }
        };
        DrawResult {
            id: subtask.id.clone(),
            image_ref,
        }
    }

    /// Sequential; each result keeps its subtask id.
    pub async fn resolve_all(&self, subtasks: &[SubTask]) -> Vec<DrawResult> {
        let mut out = Vec::with_capacity(subtasks.len());
        for task in subtasks {
            out.push(self.resolve(task).await);
        }
        out
    }
}

impl Default for DrawHandler {
    fn default() -> Self {
        Self::new(DEFAULT_DRAW_BASE_URL)
    }
}
