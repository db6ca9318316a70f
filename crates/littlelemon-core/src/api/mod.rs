//! Remote menu fetcher.
//!
//! The canonical menu lives in a single JSON document served over HTTP.
//! This module only knows how to fetch and parse it; deciding when to
//! fetch is the job of the menu cache.

pub mod client;
pub mod error;

pub use client::{MenuClient, MenuSource};
pub use error::ApiError;
