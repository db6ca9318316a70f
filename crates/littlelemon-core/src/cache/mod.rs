//! Menu caching for offline browsing.
//!
//! `MenuCache` hydrates the local menu table from the network the first
//! time it finds it empty, then answers every category/search change from
//! the local table. `SearchDebouncer` sits between raw keystrokes and the
//! cache so a burst of typing produces a single re-query.

pub mod debounce;
pub mod manager;

pub use debounce::{SearchDebouncer, SearchInput, DEFAULT_SEARCH_DEBOUNCE_MS};
pub use manager::{MenuCache, MenuState};
