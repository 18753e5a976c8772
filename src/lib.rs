//! Autopost: queued ideas in, published posts out.
//!
//! Reads post ideas from a JSONL queue, expands each one through a text
//! generation service, publishes the result to LinkedIn, and records what was
//! posted in an append-only archive.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
mod http;
pub mod idea;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod queue;
