//! Append-only log of published posts.

use crate::error::StorageError;
use crate::generation::GenerationResult;
use crate::idea::Idea;
use crate::queue::ensure_parent;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One archive line: the idea and what the generation service made of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedPost {
    pub original_idea: Idea,
    pub generated_post: Option<String>,
    pub ai_score: Option<Number>,
}

impl ArchivedPost {
    pub fn new(idea: &Idea, result: &GenerationResult) -> Self {
        Self {
            original_idea: idea.clone(),
            generated_post: result.message.clone(),
            ai_score: result.score.clone(),
        }
    }
}

/// Durable append-only post archive
#[derive(Debug, Clone)]
pub struct PostArchive {
    path: PathBuf,
}

impl PostArchive {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Prior entries are never read or rewritten.
    pub fn append(&self, idea: &Idea, result: &GenerationResult) -> Result<(), StorageError> {
        let entry = ArchivedPost::new(idea, result);
        let line = serde_json::to_string(&entry).map_err(|e| {
            StorageError::write(&self.path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        ensure_parent(&self.path)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::write(&self.path, e))?;
        writeln!(file, "{}", line).map_err(|e| StorageError::write(&self.path, e))?;
        file.flush().map_err(|e| StorageError::write(&self.path, e))?;

        debug!(text = idea.text(), archive = %self.path.display(), "Idea posted and saved");
        Ok(())
    }
}
