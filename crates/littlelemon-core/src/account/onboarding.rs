use std::sync::Arc;

use tracing::{info, warn};

use crate::kv::KeyValueStore;
use crate::store::StorageError;
use crate::validation::{validate_email, validate_name, ValidationError};

use super::{ProfileError, ProfileStore};

/// Key the onboarding flag is stored under, as "true" or "false".
pub const ONBOARDED_KEY: &str = "isOnboarded";

/// Screen shown at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Onboarding,
    Home,
}

/// Persisted flag recording whether the user finished onboarding.
pub struct OnboardingGate {
    kv: Arc<dyn KeyValueStore>,
    onboarded: bool,
}

impl OnboardingGate {
    /// Read the flag. Missing or unrecognized values count as not onboarded.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let onboarded = match kv.get(ONBOARDED_KEY)?.as_deref() {
            None => false,
            Some(raw) => serde_json::from_str::<bool>(raw).unwrap_or_else(|_| {
                warn!(value = raw, "Unrecognized onboarding flag, treating as not onboarded");
                false
            }),
        };
        Ok(Self { kv, onboarded })
    }

    pub fn is_onboarded(&self) -> bool {
        self.onboarded
    }

    pub fn initial_screen(&self) -> Screen {
        if self.onboarded {
            Screen::Home
        } else {
            Screen::Onboarding
        }
    }

    pub fn complete(&mut self) -> Result<(), StorageError> {
        self.persist(true)?;
        info!("Onboarding complete");
        Ok(())
    }

    /// Return to onboarding on next start. The profile is kept.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.persist(false)?;
        info!("Logged out");
        Ok(())
    }

    fn persist(&mut self, onboarded: bool) -> Result<(), StorageError> {
        self.kv.set(ONBOARDED_KEY, if onboarded { "true" } else { "false" })?;
        self.onboarded = onboarded;
        Ok(())
    }
}

/// The two fields asked for during onboarding.
#[derive(Debug, Clone, Default)]
pub struct OnboardingForm {
    pub first_name: String,
    pub email: String,
}

impl OnboardingForm {
    pub fn new(first_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !validate_name(&self.first_name) {
            return Err(ValidationError::FirstName);
        }
        if !validate_email(&self.email) {
            return Err(ValidationError::Email);
        }
        Ok(())
    }

    /// Whether the continue action should be offered.
    pub fn can_continue(&self) -> bool {
        self.validate().is_ok()
    }

    /// Save the entered name and email to the profile and mark onboarding done.
    pub fn submit(
        &self,
        gate: &mut OnboardingGate,
        profile: &mut ProfileStore,
    ) -> Result<(), ProfileError> {
        self.validate()?;

        let draft = profile.draft_mut();
        draft.first_name = self.first_name.clone();
        draft.email = self.email.clone();
        profile.commit()?;

        gate.complete()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::account::profile::PERSONAL_INFO_KEY;

    fn kv() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_fresh_install_shows_onboarding() {
        let gate = OnboardingGate::load(kv()).unwrap();
        assert!(!gate.is_onboarded());
        assert_eq!(gate.initial_screen(), Screen::Onboarding);
    }

    #[test]
    fn test_complete_persists() {
        let kv = kv();
        let mut gate = OnboardingGate::load(Arc::clone(&kv)).unwrap();
        gate.complete().unwrap();
        assert_eq!(kv.get(ONBOARDED_KEY).unwrap().as_deref(), Some("true"));

        let reloaded = OnboardingGate::load(kv).unwrap();
        assert_eq!(reloaded.initial_screen(), Screen::Home);
    }

    #[test]
    fn test_garbage_flag_is_not_onboarded() {
        let kv = kv();
        kv.set(ONBOARDED_KEY, "yes please").unwrap();
        assert!(!OnboardingGate::load(kv).unwrap().is_onboarded());
    }

    #[test]
    fn test_logout_keeps_profile() {
        let kv = kv();
        let mut gate = OnboardingGate::load(Arc::clone(&kv)).unwrap();
        let mut profile = ProfileStore::load(Arc::clone(&kv)).unwrap();

        OnboardingForm::new("Tilly", "tilly@littlelemon.com")
            .submit(&mut gate, &mut profile)
            .unwrap();
        assert!(gate.is_onboarded());

        gate.logout().unwrap();
        assert_eq!(kv.get(ONBOARDED_KEY).unwrap().as_deref(), Some("false"));
        assert_eq!(gate.initial_screen(), Screen::Onboarding);

        let reloaded = ProfileStore::load(kv).unwrap();
        assert_eq!(reloaded.committed().first_name, "Tilly");
        assert_eq!(reloaded.committed().email, "tilly@littlelemon.com");
    }

    #[test]
    fn test_form_validation_gates_continue() {
        assert!(OnboardingForm::new("Tilly", "tilly@littlelemon.com").can_continue());
        assert_eq!(
            OnboardingForm::new("O'Brien", "ob@example.com").validate(),
            Err(ValidationError::FirstName)
        );
        assert_eq!(
            OnboardingForm::new("Tilly", "tilly").validate(),
            Err(ValidationError::Email)
        );
        assert!(!OnboardingForm::default().can_continue());
    }

    #[test]
    fn test_invalid_submit_changes_nothing() {
        let kv = kv();
        let mut gate = OnboardingGate::load(Arc::clone(&kv)).unwrap();
        let mut profile = ProfileStore::load(Arc::clone(&kv)).unwrap();

        let result = OnboardingForm::new("", "tilly@littlelemon.com").submit(&mut gate, &mut profile);
        assert!(matches!(result, Err(ProfileError::Invalid(ValidationError::FirstName))));
        assert!(!gate.is_onboarded());
        assert_eq!(kv.get(PERSONAL_INFO_KEY).unwrap(), None);
        assert_eq!(kv.get(ONBOARDED_KEY).unwrap(), None);
    }
}
