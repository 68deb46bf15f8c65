//! Keyboard models.
//!
//! A keyboard model belongs to exactly one brand and may carry an
//! embedded product image. Physical units are tracked separately as
//! [`crate::models::KeyboardInstance`] records.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::sanitizer::{non_empty, sanitize};

/// Image content types accepted for keyboard uploads.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Keyboard document as stored in the `keyboards` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Document id, assigned at construction time.
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Model name.
    pub name: String,

    /// Owning brand reference.
    pub brand: ObjectId,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Listed price in whole currency units. Always at least 1.
    pub price: i64,

    /// Embedded product image bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Binary>,

    /// Content type of the embedded image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_content_type: Option<String>,
}

impl Keyboard {
    /// Collection holding keyboard documents.
    pub const COLLECTION: &'static str = "keyboards";

    /// Detail page path for this keyboard.
    pub fn url(&self) -> String {
        format!("/inventory/keyboard/{}", self.id.to_hex())
    }
}

/// A validated image attachment extracted from a multipart submission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// Declared content type, already checked against the allow-list.
    pub content_type: String,
}

impl ImageUpload {
    /// Checks a declared MIME type against the allow-list.
    pub fn is_allowed_type(content_type: &str) -> bool {
        ALLOWED_IMAGE_TYPES.contains(&content_type)
    }

    /// Converts the upload into BSON binary storage form.
    pub fn into_binary(self) -> (Binary, String) {
        (
            Binary {
                subtype: BinarySubtype::Generic,
                bytes: self.bytes,
            },
            self.content_type,
        )
    }
}

/// Raw keyboard form submission. Untrusted until sanitized and validated.
///
/// `brand` and `price` arrive as strings and are coerced by the
/// validation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct KeyboardForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: String,

    /// Brand reference as a hex id.
    #[serde(default)]
    pub brand: String,

    /// Optional; an empty submission is treated as absent.
    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,

    /// Price as submitted; coerced to an integer ≥ 1.
    #[serde(default)]
    pub price: String,
}

impl KeyboardForm {
    /// Trims and escapes every field for safe redisplay.
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize(&self.name),
            brand: sanitize(&self.brand),
            description: sanitize(&self.description),
            price: sanitize(&self.price),
        }
    }

    /// Builds the document once validation has passed and references have
    /// been coerced.
    pub fn into_keyboard(
        self,
        id: ObjectId,
        brand: ObjectId,
        price: i64,
        image: Option<ImageUpload>,
    ) -> Keyboard {
        let (image, image_content_type) = match image {
            Some(upload) => {
                let (binary, content_type) = upload.into_binary();
                (Some(binary), Some(content_type))
            }
            None => (None, None),
        };
        Keyboard {
            id,
            name: self.name,
            brand,
            description: non_empty(self.description),
            price,
            image,
            image_content_type,
        }
    }
}

impl From<Keyboard> for KeyboardForm {
    /// Pre-fills the update form from a stored document.
    fn from(keyboard: Keyboard) -> Self {
        Self {
            name: keyboard.name,
            brand: keyboard.brand.to_hex(),
            description: keyboard.description.unwrap_or_default(),
            price: keyboard.price.to_string(),
        }
    }
}

/// Keyboard item for list and detail payloads, with the brand resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeyboardItem {
    /// Document id as a hex string.
    pub id: String,
    /// Model name.
    pub name: String,
    /// Owning brand reference as a hex id.
    pub brand_id: String,
    /// Brand display name, when resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Listed price in whole currency units.
    pub price: i64,
    /// Whether an image is embedded.
    pub has_image: bool,
    /// Detail page path.
    pub url: String,
}

impl KeyboardItem {
    /// Builds an item, resolving the brand display name when available.
    pub fn new(keyboard: Keyboard, brand_name: Option<String>) -> Self {
        let url = keyboard.url();
        Self {
            id: keyboard.id.to_hex(),
            name: keyboard.name,
            brand_id: keyboard.brand.to_hex(),
            brand_name,
            description: keyboard.description,
            price: keyboard.price,
            has_image: keyboard.image.is_some(),
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard(name: &str, price: i64) -> Keyboard {
        Keyboard {
            id: ObjectId::new(),
            name: name.into(),
            brand: ObjectId::new(),
            description: None,
            price,
            image: None,
            image_content_type: None,
        }
    }

    #[test]
    fn test_allowed_image_types() {
        assert!(ImageUpload::is_allowed_type("image/png"));
        assert!(ImageUpload::is_allowed_type("image/jpeg"));
        assert!(ImageUpload::is_allowed_type("image/jpg"));
        assert!(!ImageUpload::is_allowed_type("image/gif"));
        assert!(!ImageUpload::is_allowed_type("text/html"));
    }

    #[test]
    fn test_item_resolves_brand_name() {
        let kb = keyboard("Classic", 145);
        let item = KeyboardItem::new(kb.clone(), Some("HHKB".into()));
        assert_eq!(item.brand_name.as_deref(), Some("HHKB"));
        assert_eq!(item.url, kb.url());
        assert!(!item.has_image);
    }

    #[test]
    fn test_into_keyboard_attaches_image() {
        let form = KeyboardForm {
            name: "One 2".into(),
            brand: ObjectId::new().to_hex(),
            description: String::new(),
            price: "130".into(),
        };
        let upload = ImageUpload {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            content_type: "image/png".into(),
        };
        let kb = form.into_keyboard(ObjectId::new(), ObjectId::new(), 130, Some(upload));
        assert_eq!(kb.image_content_type.as_deref(), Some("image/png"));
        assert_eq!(kb.image.as_ref().map(|b| b.bytes.len()), Some(4));
        assert_eq!(kb.description, None);
    }
}
