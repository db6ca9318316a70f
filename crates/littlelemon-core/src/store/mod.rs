//! Local relational storage for the menu.
//!
//! A single SQLite table, `menuitems`, holds the menu once it has been
//! hydrated from the network. All filtering and searching after that is
//! answered from this table.

pub mod error;
pub mod menu_store;

pub use error::StorageError;
pub use menu_store::MenuStore;
