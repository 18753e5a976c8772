//! Configuration sources, one module per layer.

pub(super) mod environment;
pub(super) mod global_file;
pub(super) mod workspace_file;
