//! Menu image localization.
//!
//! Menu images are downloaded once, during hydration, to a stable local
//! path so the menu can be shown offline.

pub mod localizer;

pub use localizer::{AssetLocalizer, ImageLocalizer};
