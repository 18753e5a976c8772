//! Merge rules: defaults, override order, conflict handling.

use crate::config::{
    default_archive_path, default_generation_url, default_ideas_path, default_publishing_url,
    default_throttle_secs,
};
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generation.base_url", default_generation_url())?
        .set_default("publishing.base_url", default_publishing_url())?
        .set_default(
            "queue.ideas_path",
            default_ideas_path().to_string_lossy().into_owned(),
        )?
        .set_default(
            "queue.archive_path",
            default_archive_path().to_string_lossy().into_owned(),
        )?
        .set_default("pipeline.throttle_secs", default_throttle_secs())
}
