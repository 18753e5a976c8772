//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::archive::PostArchive;
use crate::cli::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_add_result, format_idea_list_json, format_idea_list_text, format_run_summary,
    format_validation_errors,
};
use crate::config::{AutopostConfig, ConfigLoader};
use crate::error::PipelineError;
use crate::generation::{GenerationClient, PersonalAiClient};
use crate::idea::Idea;
use crate::pipeline::{LoopOptions, PublishLoop};
use crate::publish::{ActorResolver, LinkedInClient, PublishClient};
use crate::queue::{IdeaStore, QueueLock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: the configuration loaded once and the file paths it resolves to.
pub struct RunContext {
    config: AutopostConfig,
    ideas_path: PathBuf,
    archive_path: PathBuf,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PipelineError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    /// Create run context from an already-built configuration.
    pub fn with_config(workspace_root: PathBuf, config: AutopostConfig) -> Self {
        let (ideas_path, archive_path) = config.queue.resolve_paths(&workspace_root);
        Self {
            config,
            ideas_path,
            archive_path,
        }
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, PipelineError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = name, "Executing command");

        let result = match command {
            Commands::Run {
                limit,
                throttle_secs,
            } => self.handle_run(*limit, *throttle_secs),
            Commands::Add { text } => self.handle_add(text),
            Commands::List { format } => self.handle_list(format),
            Commands::Whoami => self.handle_whoami(),
            Commands::Validate => self.handle_validate(),
        };

        debug!(
            command = name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn store(&self) -> IdeaStore {
        IdeaStore::new(&self.ideas_path)
    }

    fn lock_queue(&self) -> Result<Option<QueueLock>, PipelineError> {
        if self.config.queue.lock {
            Ok(Some(QueueLock::acquire(&self.ideas_path)?))
        } else {
            Ok(None)
        }
    }

    fn require_valid_config(&self) -> Result<(), PipelineError> {
        self.config
            .validate()
            .map_err(|errors| PipelineError::Config(format_validation_errors(&errors)))
    }

    fn runtime() -> Result<tokio::runtime::Runtime, PipelineError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| PipelineError::Config(format!("Failed to create async runtime: {}", e)))
    }

    fn handle_run(
        &self,
        limit: Option<usize>,
        throttle_secs: Option<u64>,
    ) -> Result<String, PipelineError> {
        self.require_valid_config()?;
        if limit == Some(0) {
            return Err(PipelineError::Config("--limit must be at least 1".to_string()));
        }

        let options = LoopOptions {
            throttle: throttle_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| self.config.pipeline.throttle()),
            disclaimer: self.config.pipeline.disclaimer.clone(),
            max_posts: limit,
        };

        let generator: Arc<dyn GenerationClient> =
            Arc::new(PersonalAiClient::new(&self.config.generation)?);
        let linkedin = LinkedInClient::new(&self.config.publishing)?;

        let rt = Self::runtime()?;
        let summary = rt.block_on(async {
            let actor = linkedin.resolve_actor_identity().await?;
            let publisher: Arc<dyn PublishClient> = Arc::new(linkedin.into_publisher(actor));

            // Released when this block returns, including after a shutdown signal.
            let _lock = self.lock_queue()?;

            info!(
                queue = %self.ideas_path.display(),
                archive = %self.archive_path.display(),
                throttle_secs = options.throttle.as_secs(),
                "Publish loop started"
            );
            PublishLoop::new(
                self.store(),
                PostArchive::new(&self.archive_path),
                generator,
                publisher,
                options,
            )
            .run_until(shutdown_signal())
            .await
        })?;

        Ok(format_run_summary(&summary))
    }

    fn handle_add(&self, text: &str) -> Result<String, PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::Config("Idea text cannot be empty".to_string()));
        }

        let _lock = self.lock_queue()?;
        let idea = Idea::new(text);
        self.store().append(&idea)?;
        info!(text = idea.text(), queue = %self.ideas_path.display(), "Idea queued");
        Ok(format_add_result(&idea, &self.ideas_path))
    }

    fn handle_list(&self, format: &str) -> Result<String, PipelineError> {
        let ideas = self.store().load_all()?;
        match format {
            "json" => format_idea_list_json(&ideas),
            "text" => Ok(format_idea_list_text(&ideas)),
            other => Err(PipelineError::Config(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }

    fn handle_whoami(&self) -> Result<String, PipelineError> {
        self.config
            .publishing
            .validate()
            .map_err(|errors| PipelineError::Config(errors.join("; ")))?;

        let linkedin = LinkedInClient::new(&self.config.publishing)?;
        let rt = Self::runtime()?;
        let actor = rt.block_on(linkedin.resolve_actor_identity())?;
        Ok(actor.urn())
    }

    fn handle_validate(&self) -> Result<String, PipelineError> {
        self.require_valid_config()?;
        Ok(format!(
            "Configuration is valid.\n  Queue: {}\n  Archive: {}\n  Throttle: {}s",
            self.ideas_path.display(),
            self.archive_path.display(),
            self.config.pipeline.throttle_secs
        ))
    }
}

/// Completes on SIGINT, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
