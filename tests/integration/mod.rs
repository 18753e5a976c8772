//! Integration tests for the autopost pipeline

mod end_to_end;
mod queue_properties;
mod test_utils;
