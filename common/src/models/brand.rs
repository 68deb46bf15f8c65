//! Brand models.
//!
//! A brand is identified by a canonical lowercase `name`, unique across
//! the collection; `display_name` carries the human-readable form.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::sanitizer::{canonical, non_empty, sanitize};

/// Brand document as stored in the `brands` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// Document id, assigned at construction time.
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Canonical lowercase identifier. No two brands share one.
    pub name: String,

    /// Human-readable display form.
    pub display_name: String,

    /// Country or region of origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Brand {
    /// Collection holding brand documents.
    pub const COLLECTION: &'static str = "brands";

    /// Detail page path for this brand.
    pub fn url(&self) -> String {
        format!("/inventory/brand/{}", self.id.to_hex())
    }
}

/// Raw brand form submission. Untrusted until sanitized and validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BrandForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Display name must be 3-100 characters"))]
    pub display_name: String,

    /// Optional; an empty submission is treated as absent.
    #[serde(default)]
    #[validate(length(max = 100, message = "Origin must be at most 100 characters"))]
    pub origin: String,

    /// Optional; an empty submission is treated as absent.
    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,
}

impl BrandForm {
    /// Trims and escapes every field for safe redisplay.
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize(&self.name),
            display_name: sanitize(&self.display_name),
            origin: sanitize(&self.origin),
            description: sanitize(&self.description),
        }
    }

    /// Builds the document once validation has passed.
    pub fn into_brand(self, id: ObjectId) -> Brand {
        Brand {
            id,
            name: canonical(&self.name),
            display_name: self.display_name,
            origin: non_empty(self.origin),
            description: non_empty(self.description),
        }
    }
}

impl From<Brand> for BrandForm {
    /// Pre-fills the update form from a stored document.
    fn from(brand: Brand) -> Self {
        Self {
            name: brand.name,
            display_name: brand.display_name,
            origin: brand.origin.unwrap_or_default(),
            description: brand.description.unwrap_or_default(),
        }
    }
}

/// Brand item for list and detail payloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandItem {
    /// Document id as a hex string.
    pub id: String,
    /// Canonical lowercase identifier.
    pub name: String,
    /// Human-readable display form.
    pub display_name: String,
    /// Country or region of origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Detail page path.
    pub url: String,
}

impl From<Brand> for BrandItem {
    fn from(brand: Brand) -> Self {
        let url = brand.url();
        Self {
            id: brand.id.to_hex(),
            name: brand.name,
            display_name: brand.display_name,
            origin: brand.origin,
            description: brand.description,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_contains_id() {
        let brand = Brand {
            id: ObjectId::new(),
            name: "ducky".into(),
            display_name: "Ducky".into(),
            origin: Some("United States".into()),
            description: None,
        };
        assert_eq!(brand.url(), format!("/inventory/brand/{}", brand.id.to_hex()));
    }

    #[test]
    fn test_into_brand_normalizes_name_and_drops_empty_optionals() {
        let form = BrandForm {
            name: "Ducky".into(),
            display_name: "Ducky".into(),
            origin: String::new(),
            description: String::new(),
        };
        let brand = form.into_brand(ObjectId::new());
        assert_eq!(brand.name, "ducky");
        assert_eq!(brand.origin, None);
        assert_eq!(brand.description, None);
    }

    #[test]
    fn test_short_name_is_rejected() {
        let form = BrandForm {
            name: "ab".into(),
            display_name: "AB Keys".into(),
            ..Default::default()
        };
        assert!(validator::Validate::validate(&form).is_err());
    }

    #[test]
    fn test_sanitized_trims_and_escapes() {
        let form = BrandForm {
            name: "  ducky  ".into(),
            display_name: "<Ducky>".into(),
            ..Default::default()
        };
        let clean = form.sanitized();
        assert_eq!(clean.name, "ducky");
        assert_eq!(clean.display_name, "&lt;Ducky&gt;");
    }
}
