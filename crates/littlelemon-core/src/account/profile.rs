use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::kv::KeyValueStore;
use crate::models::PersonalInfo;
use crate::store::StorageError;
use crate::validation::{validate_personal_info, ValidationError};

/// Key the profile blob is stored under.
pub const PERSONAL_INFO_KEY: &str = "personalInfo";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Failed to save profile: {0}")]
    Storage(#[from] StorageError),
}

/// The user's profile as a committed copy plus an editable draft.
///
/// Edits go to the draft only. `commit` validates and persists the draft;
/// `discard` throws it away. The two are never synced implicitly.
pub struct ProfileStore {
    kv: Arc<dyn KeyValueStore>,
    committed: PersonalInfo,
    draft: PersonalInfo,
}

impl ProfileStore {
    /// Load the stored profile, merged over defaults.
    ///
    /// A malformed blob is logged and treated as no profile.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let committed = match kv.get(PERSONAL_INFO_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(error = %e, "Stored profile is malformed, using defaults");
                PersonalInfo::default()
            }),
            None => PersonalInfo::default(),
        };
        debug!(has_email = !committed.email.is_empty(), "Profile loaded");

        Ok(Self {
            kv,
            draft: committed.clone(),
            committed,
        })
    }

    pub fn committed(&self) -> &PersonalInfo {
        &self.committed
    }

    pub fn draft(&self) -> &PersonalInfo {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PersonalInfo {
        &mut self.draft
    }

    /// Whether the draft differs from what is saved.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    pub fn validate_draft(&self) -> Result<(), ValidationError> {
        validate_personal_info(&self.draft)
    }

    /// Whether the save action should be offered.
    pub fn can_save(&self) -> bool {
        self.validate_draft().is_ok()
    }

    /// Validate and persist the draft, making it the committed profile.
    pub fn commit(&mut self) -> Result<(), ProfileError> {
        self.validate_draft()?;
        let json = serde_json::to_string(&self.draft).map_err(StorageError::from)?;
        self.kv.set(PERSONAL_INFO_KEY, &json)?;
        self.committed = self.draft.clone();
        info!("Profile saved");
        Ok(())
    }

    /// Drop unsaved edits.
    pub fn discard(&mut self) {
        self.draft = self.committed.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn kv() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    fn fill_valid(info: &mut PersonalInfo) {
        info.first_name = "Tilly".to_string();
        info.last_name = "Adams".to_string();
        info.email = "tilly@littlelemon.com".to_string();
        info.number = "312-555-0199".to_string();
    }

    #[test]
    fn test_load_missing_profile_is_default() {
        let profile = ProfileStore::load(kv()).unwrap();
        assert_eq!(profile.committed(), &PersonalInfo::default());
        assert!(!profile.is_dirty());
    }

    #[test]
    fn test_load_merges_partial_blob() {
        let kv = kv();
        kv.set(PERSONAL_INFO_KEY, r#"{"firstName": "Tilly", "isOrderStatus": true}"#)
            .unwrap();

        let profile = ProfileStore::load(kv).unwrap();
        assert_eq!(profile.committed().first_name, "Tilly");
        assert!(profile.committed().is_order_status);
        assert_eq!(profile.draft(), profile.committed());
    }

    #[test]
    fn test_load_malformed_blob_is_default() {
        let kv = kv();
        kv.set(PERSONAL_INFO_KEY, "[1, 2").unwrap();
        let profile = ProfileStore::load(kv).unwrap();
        assert_eq!(profile.committed(), &PersonalInfo::default());
    }

    #[test]
    fn test_commit_persists_draft() {
        let kv = kv();
        let mut profile = ProfileStore::load(Arc::clone(&kv)).unwrap();
        fill_valid(profile.draft_mut());
        profile.draft_mut().is_newsletter = true;
        assert!(profile.is_dirty());

        profile.commit().unwrap();
        assert!(!profile.is_dirty());

        let reloaded = ProfileStore::load(kv).unwrap();
        assert_eq!(reloaded.committed().first_name, "Tilly");
        assert!(reloaded.committed().is_newsletter);
    }

    #[test]
    fn test_discard_restores_committed() {
        let mut profile = ProfileStore::load(kv()).unwrap();
        fill_valid(profile.draft_mut());
        profile.commit().unwrap();

        profile.draft_mut().first_name = "Changed".to_string();
        profile.draft_mut().set_avatar("/tmp/avatar.png");
        assert!(profile.is_dirty());

        profile.discard();
        assert!(!profile.is_dirty());
        assert_eq!(profile.draft().first_name, "Tilly");
        assert!(profile.draft().avatar.is_none());
    }

    #[test]
    fn test_invalid_phone_blocks_save() {
        let kv = kv();
        let mut profile = ProfileStore::load(Arc::clone(&kv)).unwrap();
        fill_valid(profile.draft_mut());
        profile.draft_mut().number = "not a phone".to_string();

        assert!(!profile.can_save());
        assert!(matches!(
            profile.commit(),
            Err(ProfileError::Invalid(ValidationError::Phone))
        ));
        // Nothing reached storage
        assert_eq!(kv.get(PERSONAL_INFO_KEY).unwrap(), None);
        assert!(profile.is_dirty());
    }
}
