//! Keyboard switch models.
//!
//! A switch type (e.g. Topre, Cherry MX Red). Same canonical-name
//! uniqueness rule as [`crate::models::Brand`].

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::sanitizer::{canonical, non_empty, sanitize};

/// Switch document as stored in the `switches` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardSwitch {
    /// Document id, assigned at construction time.
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Canonical lowercase identifier. No two switches share one.
    pub name: String,

    /// Human-readable display form.
    pub display_name: String,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl KeyboardSwitch {
    /// Collection holding switch documents.
    pub const COLLECTION: &'static str = "switches";

    /// Detail page path for this switch.
    pub fn url(&self) -> String {
        format!("/inventory/keyboardswitch/{}", self.id.to_hex())
    }
}

/// Raw switch form submission. Untrusted until sanitized and validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct KeyboardSwitchForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Display name must be 3-100 characters"))]
    pub display_name: String,

    /// Optional; an empty submission is treated as absent.
    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,
}

impl KeyboardSwitchForm {
    /// Trims and escapes every field for safe redisplay.
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize(&self.name),
            display_name: sanitize(&self.display_name),
            description: sanitize(&self.description),
        }
    }

    /// Builds the document once validation has passed.
    pub fn into_switch(self, id: ObjectId) -> KeyboardSwitch {
        KeyboardSwitch {
            id,
            name: canonical(&self.name),
            display_name: self.display_name,
            description: non_empty(self.description),
        }
    }
}

impl From<KeyboardSwitch> for KeyboardSwitchForm {
    /// Pre-fills the update form from a stored document.
    fn from(switch: KeyboardSwitch) -> Self {
        Self {
            name: switch.name,
            display_name: switch.display_name,
            description: switch.description.unwrap_or_default(),
        }
    }
}

/// Switch item for list and detail payloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeyboardSwitchItem {
    /// Document id as a hex string.
    pub id: String,
    /// Canonical lowercase identifier.
    pub name: String,
    /// Human-readable display form.
    pub display_name: String,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Detail page path.
    pub url: String,
}

impl From<KeyboardSwitch> for KeyboardSwitchItem {
    fn from(switch: KeyboardSwitch) -> Self {
        let url = switch.url();
        Self {
            id: switch.id.to_hex(),
            name: switch.name,
            display_name: switch.display_name,
            description: switch.description,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_switch_normalizes_name() {
        let form = KeyboardSwitchForm {
            name: "Cherry MX Red".into(),
            display_name: "Cherry MX Red".into(),
            description: String::new(),
        };
        let switch = form.into_switch(ObjectId::new());
        assert_eq!(switch.name, "cherry mx red");
        assert_eq!(switch.description, None);
    }

    #[test]
    fn test_url_contains_id() {
        let switch = KeyboardSwitch {
            id: ObjectId::new(),
            name: "topre".into(),
            display_name: "Topre".into(),
            description: None,
        };
        assert!(switch.url().contains(&switch.id.to_hex()));
    }
}
