//! Small persistent key-value storage.
//!
//! Holds the profile blob and the onboarding flag. Values are strings; the
//! callers decide how to encode them.

pub mod store;

pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
