use serde::{Deserialize, Serialize};

/// The user's profile, persisted as a single JSON blob.
///
/// Every field has a default so that a partially stored record is merged
/// over the defaults when loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub number: String,
    pub is_order_status: bool,
    pub is_special_offers: bool,
    pub is_newsletter: bool,
    /// Local path of the chosen avatar image.
    pub avatar: Option<String>,
}

impl PersonalInfo {
    /// Placeholder shown instead of an avatar image: first letters of the
    /// first and last name, upper-cased.
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn set_avatar(&mut self, path: impl Into<String>) {
        self.avatar = Some(path.into());
    }

    pub fn remove_avatar(&mut self) {
        self.avatar = None;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
