//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::PipelineError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &PipelineError) -> String {
    format!("Error: {}", e)
}
