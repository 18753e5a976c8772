//! Generation Client
//!
//! Turns a raw idea into a long-form message and a quality score through the
//! Personal.AI message endpoint. One blocking request per idea; failures are
//! returned to the caller unretried.

use crate::config::GenerationConfig;
use crate::error::PipelineError;
use crate::http::{build_http_client, error_body, normalize_base_url};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::debug;

/// Shown in the post when the service returns no message
pub const MISSING_MESSAGE_PLACEHOLDER: &str = "No valid message returned by Personal.AI";

/// Shown in the score line when the service returns no score
pub const MISSING_SCORE_PLACEHOLDER: &str = "No AI score provided.";

/// Generated content for one idea
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(rename = "ai_message", default)]
    pub message: Option<String>,

    #[serde(rename = "ai_score", default)]
    pub score: Option<Number>,
}

impl GenerationResult {
    pub fn message_or_placeholder(&self) -> &str {
        self.message.as_deref().unwrap_or(MISSING_MESSAGE_PLACEHOLDER)
    }

    /// The score as the service sent it (`7.5`, `7`), or the placeholder.
    pub fn score_display(&self) -> String {
        match &self.score {
            Some(score) => score.to_string(),
            None => MISSING_SCORE_PLACEHOLDER.to_string(),
        }
    }
}

/// Capability that expands idea text into a generated post
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, text: &str) -> Result<GenerationResult, PipelineError>;
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

/// Client for the Personal.AI `/message` endpoint
pub struct PersonalAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PersonalAiClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_http_client(config.request_timeout())?,
            api_key: config.api_key.clone(),
            base_url: normalize_base_url(&config.base_url),
        })
    }
}

#[async_trait]
impl GenerationClient for PersonalAiClient {
    async fn generate(&self, text: &str) -> Result<GenerationResult, PipelineError> {
        debug!("Preparing to send message to Personal.AI");

        let url = format!("{}/message", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&MessageRequest { text })
            .send()
            .await
            .map_err(|e| PipelineError::GenerationRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Generation {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let result: GenerationResult = response.json().await.map_err(|e| {
            PipelineError::GenerationRequest(format!("Failed to parse response: {}", e))
        })?;

        debug!(
            has_message = result.message.is_some(),
            score = %result.score_display(),
            "Generation response received"
        );
        Ok(result)
    }
}
