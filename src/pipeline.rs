//! Publish Loop
//!
//! Sequential worker that drains the idea queue: pick an idea, generate a post,
//! publish it, archive it, drop it from the queue, wait, repeat. Any failure in
//! generation, publishing or recording ends the run with that error and leaves
//! the queue as it was before the failing step. A shutdown request ends the run
//! cleanly at the next await point with the idea in flight still queued.

use crate::archive::PostArchive;
use crate::error::PipelineError;
use crate::generation::{GenerationClient, GenerationResult};
use crate::idea::Idea;
use crate::publish::PublishClient;
use crate::queue::IdeaStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Final text for a generated result: message, blank line, score line, disclaimer.
pub fn compose_post(result: &GenerationResult, disclaimer: &str) -> String {
    format!(
        "{}\n\nAI Score: {}{}",
        result.message_or_placeholder(),
        result.score_display(),
        disclaimer
    )
}

/// Loop tuning
#[derive(Debug, Clone)]
pub struct LoopOptions {
    /// Delay between consecutive posts
    pub throttle: Duration,
    /// Appended to every post
    pub disclaimer: String,
    /// Stop after this many successful posts
    pub max_posts: Option<usize>,
}

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    LimitReached,
    /// A shutdown request arrived while generating, publishing or waiting
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub published: usize,
    pub stop: StopReason,
}

#[derive(Debug)]
enum LoopState {
    CheckPending,
    Select,
    Generate(Idea),
    Publish(Idea, GenerationResult),
    Record(Idea, GenerationResult),
    Throttle,
    Done(StopReason),
}

pub struct PublishLoop {
    store: IdeaStore,
    archive: PostArchive,
    generator: Arc<dyn GenerationClient>,
    publisher: Arc<dyn PublishClient>,
    options: LoopOptions,
}

impl PublishLoop {
    pub fn new(
        store: IdeaStore,
        archive: PostArchive,
        generator: Arc<dyn GenerationClient>,
        publisher: Arc<dyn PublishClient>,
        options: LoopOptions,
    ) -> Self {
        Self {
            store,
            archive,
            generator,
            publisher,
            options,
        }
    }

    fn limit_reached(&self, published: usize) -> bool {
        self.options.max_posts.is_some_and(|max| published >= max)
    }

    /// Run until the queue is empty, the post limit is hit, or a step fails.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Like [`PublishLoop::run`], but stops with [`StopReason::Interrupted`]
    /// once `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<RunSummary, PipelineError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut published = 0usize;
        let mut state = LoopState::CheckPending;

        loop {
            state = match state {
                LoopState::CheckPending => {
                    if self.limit_reached(published) {
                        LoopState::Done(StopReason::LimitReached)
                    } else if self.store.has_pending()? {
                        LoopState::Select
                    } else {
                        LoopState::Done(StopReason::Exhausted)
                    }
                }
                LoopState::Select => {
                    info!("Fetching random idea from queue");
                    match self.store.pick_random()? {
                        Some(idea) => {
                            info!(text = idea.text(), "Selected idea");
                            LoopState::Generate(idea)
                        }
                        None => LoopState::Done(StopReason::Exhausted),
                    }
                }
                LoopState::Generate(idea) => {
                    info!("Sending idea to generation service");
                    let text = idea.text().to_string();
                    tokio::select! {
                        result = self.generator.generate(&text) => {
                            let result = result.map_err(|e| {
                                error!(text = %text, error = %e, "Generation failed; idea stays queued");
                                e
                            })?;
                            LoopState::Publish(idea, result)
                        }
                        _ = &mut shutdown => {
                            warn!(text = %text, "Shutdown during generation; idea stays queued");
                            LoopState::Done(StopReason::Interrupted)
                        }
                    }
                }
                LoopState::Publish(idea, result) => {
                    let post = compose_post(&result, &self.options.disclaimer);
                    debug!(post = %post, "Generated post");

                    info!("Sending generated post to publishing destination");
                    let outcome = tokio::select! {
                        outcome = self.publisher.publish(&post) => Some(outcome),
                        _ = &mut shutdown => None,
                    };
                    let Some(outcome) = outcome else {
                        warn!(
                            text = idea.text(),
                            "Shutdown while publishing; the post may have gone out, idea stays queued"
                        );
                        state = LoopState::Done(StopReason::Interrupted);
                        continue;
                    };
                    let confirmation = outcome.map_err(|e| {
                        error!(text = idea.text(), error = %e, "Publish failed; idea stays queued");
                        e
                    })?;
                    info!(
                        status = confirmation.status,
                        post_id = confirmation.post_id.as_deref().unwrap_or("-"),
                        "Post successfully published"
                    );
                    debug!(payload = %confirmation.payload, "Publish response");
                    LoopState::Record(idea, result)
                }
                LoopState::Record(idea, result) => {
                    self.archive.append(&idea, &result).map_err(|e| {
                        error!(
                            text = idea.text(),
                            error = %e,
                            "Post was published but could not be archived; idea stays queued"
                        );
                        e
                    })?;
                    self.store.remove(&idea)?;
                    published += 1;
                    LoopState::Throttle
                }
                LoopState::Throttle => {
                    if self.limit_reached(published) {
                        LoopState::Done(StopReason::LimitReached)
                    } else if !self.store.has_pending()? {
                        LoopState::Done(StopReason::Exhausted)
                    } else {
                        if !self.options.throttle.is_zero() {
                            info!(
                                seconds = self.options.throttle.as_secs(),
                                "Waiting before next post"
                            );
                            tokio::select! {
                                _ = tokio::time::sleep(self.options.throttle) => {}
                                _ = &mut shutdown => {
                                    state = LoopState::Done(StopReason::Interrupted);
                                    continue;
                                }
                            }
                        }
                        LoopState::CheckPending
                    }
                }
                LoopState::Done(stop) => {
                    match stop {
                        StopReason::Exhausted => {
                            info!(published, "No more ideas left in the queue")
                        }
                        StopReason::LimitReached => info!(published, "Post limit reached"),
                        StopReason::Interrupted => info!(published, "Shutdown requested; run stopped"),
                    }
                    return Ok(RunSummary { published, stop });
                }
            };
        }
    }
}
