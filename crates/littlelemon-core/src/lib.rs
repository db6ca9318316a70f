//! Little Lemon core library.
//!
//! Provides everything the storefront shell needs below the view layer:
//!
//! - `api`: remote menu fetcher
//! - `assets`: menu image localization to local files
//! - `store`: the local SQLite menu table
//! - `cache`: the menu cache orchestrator and search debouncer
//! - `kv`: small persistent key-value store for profile blobs and flags
//! - `account`: profile store and onboarding gate
//! - `validation`: profile field validation

pub mod account;
pub mod api;
pub mod assets;
pub mod cache;
pub mod config;
pub mod kv;
pub mod models;
pub mod store;
pub mod utils;
pub mod validation;

pub use account::{OnboardingForm, OnboardingGate, ProfileError, ProfileStore, Screen};
pub use api::{ApiError, MenuClient, MenuSource};
pub use assets::{AssetLocalizer, ImageLocalizer};
pub use cache::{MenuCache, MenuState, SearchDebouncer, SearchInput};
pub use config::Config;
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use models::{MenuItem, PersonalInfo, Section};
pub use store::{MenuStore, StorageError};
pub use validation::ValidationError;
