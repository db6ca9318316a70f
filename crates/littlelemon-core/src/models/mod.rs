//! Data models for Little Lemon entities.
//!
//! - `MenuItem`, `MenuResponse`: menu rows and the remote wire envelope
//! - `Section`: the fixed list of menu sections used for category filters
//! - `PersonalInfo`: the single user profile record

pub mod menu;
pub mod profile;

pub use menu::{MenuItem, MenuResponse, Section};
pub use profile::PersonalInfo;
