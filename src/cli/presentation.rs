//! Presentation: formatters for command results.

use crate::config::ValidationError;
use crate::error::PipelineError;
use crate::idea::Idea;
use crate::pipeline::{RunSummary, StopReason};
use serde_json::Value;
use std::path::Path;

pub fn format_run_summary(summary: &RunSummary) -> String {
    let posts = if summary.published == 1 { "post" } else { "posts" };
    match summary.stop {
        StopReason::Exhausted => format!(
            "Published {} {}. No more ideas left in the queue.",
            summary.published, posts
        ),
        StopReason::LimitReached => format!(
            "Published {} {}. Post limit reached; remaining ideas stay queued.",
            summary.published, posts
        ),
        StopReason::Interrupted => format!(
            "Published {} {}. Stopped by shutdown signal; remaining ideas stay queued.",
            summary.published, posts
        ),
    }
}

pub fn format_add_result(idea: &Idea, queue_path: &Path) -> String {
    format!("Queued idea \"{}\" in {}", idea.text(), queue_path.display())
}

pub fn format_idea_list_text(ideas: &[Idea]) -> String {
    if ideas.is_empty() {
        return "No pending ideas.".to_string();
    }
    let mut s = format!("Pending ideas ({}):", ideas.len());
    for idea in ideas {
        s.push_str(&format!("\n  - {}", idea.text()));
    }
    s
}

pub fn format_idea_list_json(ideas: &[Idea]) -> Result<String, PipelineError> {
    let records: Vec<Value> = ideas
        .iter()
        .map(|i| Value::Object(i.fields().clone()))
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "pending": records }))
        .map_err(|e| PipelineError::Config(format!("Failed to render JSON: {}", e)))
}

pub fn format_validation_errors(errors: &[ValidationError]) -> String {
    let mut s = format!("Configuration validation failed ({}):", errors.len());
    for e in errors {
        s.push_str(&format!("\n  - {}", e));
    }
    s
}
