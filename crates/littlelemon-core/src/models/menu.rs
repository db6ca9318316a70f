use serde::{Deserialize, Deserializer, Serialize};

/// A single dish on the menu.
///
/// `image` holds the bare remote file name until the item has been
/// localized, and the local file path afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Assigned by the local store on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "price_as_text")]
    pub price: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub category: String,
}

impl MenuItem {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            price: price.into(),
            description: description.into(),
            image: image.into(),
            category: category.into(),
        }
    }

    /// Price formatted for display, e.g. "$12.99"
    pub fn display_price(&self) -> String {
        format!("${}", self.price)
    }
}

/// Top-level document returned by the menu endpoint.
#[derive(Debug, Deserialize)]
pub struct MenuResponse {
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

// A null field is stored the same as a missing one.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// The endpoint has served prices both as "12.99" and as 12.99.
fn price_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<RawPrice>::deserialize(deserializer)? {
        None => String::new(),
        Some(RawPrice::Text(s)) => s,
        Some(RawPrice::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.2}", f),
            _ => n.to_string(),
        },
    })
}

/// Menu sections offered as category filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Starters,
    Mains,
    Desserts,
    Drinks,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Starters,
        Section::Mains,
        Section::Desserts,
        Section::Drinks,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Starters => "Starters",
            Section::Mains => "Mains",
            Section::Desserts => "Desserts",
            Section::Drinks => "Drinks",
        }
    }

    /// Case-folded name, as compared against stored categories.
    pub fn key(&self) -> &'static str {
        match self {
            Section::Starters => "starters",
            Section::Mains => "mains",
            Section::Desserts => "desserts",
            Section::Drinks => "drinks",
        }
    }

    /// Parse a section name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let folded = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.key() == folded)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_response() {
        let json = r#"{
            "menu": [
                {
                    "name": "Greek Salad",
                    "price": "12.99",
                    "description": "Crispy lettuce, peppers, olives and feta.",
                    "image": "greekSalad.jpg",
                    "category": "starters"
                },
                {
                    "name": "Lemon Dessert",
                    "price": 4.5,
                    "description": "Light and fluffy.",
                    "image": "lemonDessert.jpg",
                    "category": "desserts"
                }
            ]
        }"#;

        let parsed: MenuResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.menu.len(), 2);
        assert_eq!(parsed.menu[0].id, None);
        assert_eq!(parsed.menu[0].price, "12.99");
        assert_eq!(parsed.menu[1].price, "4.50");
        assert_eq!(parsed.menu[1].image, "lemonDessert.jpg");
    }

    #[test]
    fn test_integer_price_kept_as_text() {
        let item: MenuItem =
            serde_json::from_str(r#"{"name": "Water", "price": 2, "category": "drinks"}"#).unwrap();
        assert_eq!(item.price, "2");
        assert_eq!(item.display_price(), "$2");
        assert!(item.description.is_empty());
    }

    #[test]
    fn test_item_missing_price_keeps_rest_of_menu() {
        let json = r#"{"menu": [
            {"name": "Pasta", "price": "18.99", "image": "pasta.jpg", "category": "mains"},
            {"name": "Grilled Fish", "image": "grilledFish.jpg", "category": "mains"}
        ]}"#;

        let parsed: MenuResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.menu.len(), 2);
        assert_eq!(parsed.menu[0].price, "18.99");
        assert_eq!(parsed.menu[1].name, "Grilled Fish");
        assert_eq!(parsed.menu[1].price, "");
    }

    #[test]
    fn test_null_fields_become_empty() {
        let item: MenuItem = serde_json::from_str(
            r#"{"name": null, "price": null, "description": null, "image": "x.jpg", "category": null}"#,
        )
        .unwrap();
        assert_eq!(item.name, "");
        assert_eq!(item.price, "");
        assert_eq!(item.description, "");
        assert_eq!(item.category, "");
        assert_eq!(item.image, "x.jpg");
    }

    #[test]
    fn test_missing_menu_key_is_empty() {
        let parsed: MenuResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.menu.is_empty());
    }

    #[test]
    fn test_section_from_name() {
        assert_eq!(Section::from_name("Mains"), Some(Section::Mains));
        assert_eq!(Section::from_name("  DESSERTS "), Some(Section::Desserts));
        assert_eq!(Section::from_name("specials"), None);
    }

    #[test]
    fn test_section_keys_are_lowercase_titles() {
        for section in Section::ALL {
            assert_eq!(section.key(), section.title().to_lowercase());
        }
    }
}
