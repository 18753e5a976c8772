//! Idea queue
//!
//! The queue is a line-delimited file where every non-blank line holds one JSON
//! idea record. Every operation re-reads the whole file; the file is the only
//! state. Nothing marks an idea as in flight, so an idea can be picked again
//! until it is removed.

use crate::error::StorageError;
use crate::idea::Idea;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable queue of pending ideas backed by a JSONL file
#[derive(Debug, Clone)]
pub struct IdeaStore {
    path: PathBuf,
}

impl IdeaStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every record in the queue file.
    pub fn load_all(&self) -> Result<Vec<Idea>, StorageError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| StorageError::read(&self.path, e))?;

        let mut ideas = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let idea = Idea::parse_line(line).map_err(|reason| StorageError::Malformed {
                path: self.path.clone(),
                line: index + 1,
                reason,
            })?;
            ideas.push(idea);
        }
        Ok(ideas)
    }

    /// Whether any idea is still waiting to be published.
    pub fn has_pending(&self) -> Result<bool, StorageError> {
        Ok(!self.load_all()?.is_empty())
    }

    /// Pick one pending idea uniformly at random. `None` means the queue is exhausted.
    pub fn pick_random(&self) -> Result<Option<Idea>, StorageError> {
        self.pick_random_with(&mut rand::thread_rng())
    }

    /// Same as [`IdeaStore::pick_random`] with a caller-supplied RNG.
    pub fn pick_random_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<Idea>, StorageError> {
        let ideas = self.load_all()?;
        let chosen = ideas.choose(rng).cloned();
        match &chosen {
            Some(idea) => debug!(text = idea.text(), pending = ideas.len(), "Chosen idea"),
            None => warn!(path = %self.path.display(), "No ideas found in the queue"),
        }
        Ok(chosen)
    }

    /// Remove every record structurally equal to `idea` and rewrite the file.
    ///
    /// Returns the number of records removed. The rewrite goes through a
    /// sibling temp file and a rename so the queue is never half-written.
    pub fn remove(&self, idea: &Idea) -> Result<usize, StorageError> {
        let ideas = self.load_all()?;
        let before = ideas.len();
        let kept: Vec<Idea> = ideas.into_iter().filter(|i| i != idea).collect();
        let removed = before - kept.len();

        if removed == 0 {
            debug!(text = idea.text(), "Idea not in queue, nothing to remove");
            return Ok(0);
        }

        self.rewrite(&kept)?;
        debug!(text = idea.text(), removed, "Idea removed from queue");
        Ok(removed)
    }

    /// Append an idea to the end of the queue, creating the file if needed.
    pub fn append(&self, idea: &Idea) -> Result<(), StorageError> {
        ensure_parent(&self.path)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::write(&self.path, e))?;
        writeln!(file, "{}", idea.to_line()).map_err(|e| StorageError::write(&self.path, e))?;
        file.flush().map_err(|e| StorageError::write(&self.path, e))?;
        Ok(())
    }

    fn rewrite(&self, ideas: &[Idea]) -> Result<(), StorageError> {
        let temp_path = temp_path_for(&self.path);

        let mut buf = String::new();
        for idea in ideas {
            buf.push_str(&idea.to_line());
            buf.push('\n');
        }

        let write_temp = || -> io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(buf.as_bytes())?;
            file.sync_all()
        };
        write_temp().map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::write(&temp_path, e)
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::write(&self.path, e)
        })
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "queue".into());
    name.push(".tmp");
    path.with_file_name(name)
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StorageError::write(parent, e))
        }
        _ => Ok(()),
    }
}

/// Exclusive lock over a queue file, held for the duration of a run
///
/// The lock is a `<queue>.lock` file created with create-new semantics and
/// removed on drop. It records the owner pid; a lock whose owner is no longer
/// running is taken over.
#[derive(Debug)]
pub struct QueueLock {
    path: PathBuf,
}

impl QueueLock {
    pub fn acquire(queue_path: &Path) -> Result<Self, StorageError> {
        let mut name = queue_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "queue".into());
        name.push(".lock");
        let path = queue_path.with_file_name(name);

        ensure_parent(&path)?;
        let mut file = match Self::create(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let Some(pid) = stale_holder(&path) else {
                    return Err(StorageError::Locked { path });
                };
                warn!(lock = %path.display(), pid, "Taking over queue lock left by a process that is no longer running");
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(StorageError::write(&path, e)),
                }
                match Self::create(&path) {
                    Ok(file) => file,
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                        return Err(StorageError::Locked { path });
                    }
                    Err(e) => return Err(StorageError::write(&path, e)),
                }
            }
            Err(e) => return Err(StorageError::write(&path, e)),
        };
        writeln!(file, "{}", std::process::id()).map_err(|e| StorageError::write(&path, e))?;

        debug!(lock = %path.display(), "Queue lock acquired");
        Ok(Self { path })
    }

    fn create(path: &Path) -> io::Result<fs::File> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Pid recorded in an existing lock file, if that process is gone.
///
/// An unreadable or non-numeric lock counts as held: its owner may still be
/// writing the pid.
fn stale_holder(lock_path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(lock_path).ok()?;
    let pid = contents.trim().parse::<u32>().ok()?;
    (!process_is_running(pid)).then_some(pid)
}

#[cfg(target_os = "linux")]
fn process_is_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

// Without procfs the owner cannot be checked, so every lock counts as held.
#[cfg(not(target_os = "linux"))]
fn process_is_running(_pid: u32) -> bool {
    true
}

impl Drop for QueueLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "Failed to release queue lock");
        }
    }
}
