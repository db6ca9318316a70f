//! Utility functions for string formatting.

pub mod format;

#[cfg(test)]
pub(crate) mod test_server;

pub use format::{format_phone, truncate_string};
