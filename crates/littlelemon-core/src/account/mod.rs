//! User account state kept on the device.
//!
//! - `ProfileStore`: the user's profile with an explicit draft/committed pair
//! - `OnboardingGate`: the persisted "has onboarded" flag that picks the
//!   first screen
//!
//! Both are backed by a `KeyValueStore` handed in by the caller; they share
//! nothing else.

pub mod onboarding;
pub mod profile;

pub use onboarding::{OnboardingForm, OnboardingGate, Screen};
pub use profile::{ProfileError, ProfileStore};
