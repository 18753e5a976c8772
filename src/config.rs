//! Configuration System
//!
//! Layered configuration for the publish pipeline: merge-policy defaults, a
//! global config file, workspace config files and `AUTOPOST__*` environment
//! variables. Built once at startup and passed by reference to the clients.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Default text appended to every published post
pub const DEFAULT_DISCLAIMER: &str = "
Disclaimer: The contents of this post are generated by an AI. While every effort is made to ensure accuracy, any opinions or views expressed here are automated and belong to the AI. For more AI-powered content and insights, check out our website.

Thank you for reading the AI's content! Embrace the future, where AI and humans collaborate to create amazing content.

#ArtificialIntelligence #AIPowered #FutureTech #AIInsights #CollaborativeFuture #AI #Innovation
";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutopostConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub publishing: PublishingConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation service settings
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Whole-request limit for one generation call; unset means no limit
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Publishing destination settings
#[derive(Clone, Serialize, Deserialize)]
pub struct PublishingConfig {
    #[serde(default = "default_publishing_url")]
    pub base_url: String,

    #[serde(default)]
    pub access_token: String,
}

/// Queue and archive file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_ideas_path")]
    pub ideas_path: PathBuf,

    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,

    /// Hold a lock file next to the queue while mutating it
    #[serde(default = "default_true")]
    pub lock: bool,
}

/// Publish loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delay between posts, in seconds
    #[serde(default = "default_throttle_secs")]
    pub throttle_secs: u64,

    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,
}

pub(crate) fn default_generation_url() -> String {
    "https://api.personal.ai/v1".to_string()
}

pub(crate) fn default_publishing_url() -> String {
    "https://api.linkedin.com/v2".to_string()
}

pub(crate) fn default_ideas_path() -> PathBuf {
    PathBuf::from("post_ideas.jsonl")
}

pub(crate) fn default_archive_path() -> PathBuf {
    PathBuf::from("posted_posts.jsonl")
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_throttle_secs() -> u64 {
    300
}

fn default_disclaimer() -> String {
    DEFAULT_DISCLAIMER.to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_url(),
            api_key: String::new(),
            request_timeout_secs: None,
        }
    }
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            base_url: default_publishing_url(),
            access_token: String::new(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            ideas_path: default_ideas_path(),
            archive_path: default_archive_path(),
            lock: default_true(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            throttle_secs: default_throttle_secs(),
            disclaimer: default_disclaimer(),
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for PublishingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishingConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &redact(&self.access_token))
            .finish()
    }
}

impl QueueConfig {
    /// Resolve queue and archive paths against the workspace root.
    pub fn resolve_paths(&self, workspace_root: &Path) -> (PathBuf, PathBuf) {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                workspace_root.join(p)
            }
        };
        (resolve(&self.ideas_path), resolve(&self.archive_path))
    }
}

impl PipelineConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_secs(self.throttle_secs)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Generation(String),
    Publishing(String),
    Queue(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Generation(msg) => write!(f, "generation: {}", msg),
            ValidationError::Publishing(msg) => write!(f, "publishing: {}", msg),
            ValidationError::Queue(msg) => write!(f, "queue: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn validate_url(url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!("base_url must start with http:// or https:// (got '{}')", url))
    }
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Err(e) = validate_url(&self.base_url) {
            errors.push(e);
        }
        if self.api_key.trim().is_empty() {
            errors.push("api_key is not set (AUTOPOST__GENERATION__API_KEY)".to_string());
        }
        if self.request_timeout_secs == Some(0) {
            errors.push("request_timeout_secs must be at least 1 when set".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl PublishingConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Err(e) = validate_url(&self.base_url) {
            errors.push(e);
        }
        if self.access_token.trim().is_empty() {
            errors.push("access_token is not set (AUTOPOST__PUBLISHING__ACCESS_TOKEN)".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.ideas_path.as_os_str().is_empty() {
            errors.push("ideas_path cannot be empty".to_string());
        }
        if self.archive_path.as_os_str().is_empty() {
            errors.push("archive_path cannot be empty".to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        if self.ideas_path == self.archive_path {
            errors.push("ideas_path and archive_path must differ".to_string());
            return Err(errors);
        }
        Ok(())
    }
}

impl AutopostConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(msgs) = self.generation.validate() {
            errors.extend(msgs.into_iter().map(ValidationError::Generation));
        }
        if let Err(msgs) = self.publishing.validate() {
            errors.extend(msgs.into_iter().map(ValidationError::Publishing));
        }
        if let Err(msgs) = self.queue.validate() {
            errors.extend(msgs.into_iter().map(ValidationError::Queue));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
