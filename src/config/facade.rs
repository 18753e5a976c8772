//! Config facade: single entry point that assembles every source in order.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::AutopostConfig;
use crate::error::PipelineError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Loads [`AutopostConfig`] from defaults, files and environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global config file,
    /// `config/config.toml`, `config/{AUTOPOST_ENV}.toml`, `AUTOPOST__*` env vars.
    pub fn load(workspace_root: &Path) -> Result<AutopostConfig, PipelineError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: AutopostConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from one explicit file. Environment variables still apply.
    pub fn load_from_file(path: &Path) -> Result<AutopostConfig, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);

        let config: AutopostConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }
}
