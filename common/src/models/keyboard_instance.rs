//! Keyboard instance models.
//!
//! One document per physical unit. The instance owns the switch
//! reference; the keyboard model itself does not reference switches.

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::sanitizer::sanitize;

/// Sale status of a physical unit.
///
/// Declaration order matches the lexicographic order of the wire labels,
/// so deriving `Ord` gives the list sort the store would.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum InstanceStatus {
    /// Available for sale. Initial state.
    #[default]
    #[serde(rename = "In-stock")]
    InStock,
    /// Returned by a customer.
    #[serde(rename = "Returned")]
    Returned,
    /// Sold; `date_sold` records when.
    #[serde(rename = "Sold")]
    Sold,
}

impl InstanceStatus {
    /// Wire label, as stored and displayed.
    pub fn label(&self) -> &'static str {
        match self {
            InstanceStatus::InStock => "In-stock",
            InstanceStatus::Returned => "Returned",
            InstanceStatus::Sold => "Sold",
        }
    }

    /// Parses a submitted label. Unknown labels are rejected.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "In-stock" => Some(InstanceStatus::InStock),
            "Returned" => Some(InstanceStatus::Returned),
            "Sold" => Some(InstanceStatus::Sold),
            _ => None,
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Instance document as stored in the `instances` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardInstance {
    /// Document id, assigned at construction time.
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Keyboard model reference.
    pub keyboard: ObjectId,

    /// Sale status.
    pub status: InstanceStatus,

    /// Switch fitted in this unit.
    pub keyboard_switch: ObjectId,

    /// Set only while the status is `Sold`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_sold: Option<DateTime>,
}

impl KeyboardInstance {
    /// Collection holding instance documents.
    pub const COLLECTION: &'static str = "instances";

    /// Detail page path for this instance.
    pub fn url(&self) -> String {
        format!("/inventory/keyboardinstance/{}", self.id.to_hex())
    }

    /// Locale-formatted `date_sold` for display (e.g. "Mar  4, 2026").
    pub fn date_sold_formatted(&self) -> Option<String> {
        self.date_sold
            .map(|d| d.to_chrono().format("%b %e, %Y").to_string())
    }
}

/// Applies the status state machine rule to a submitted sale date:
/// entering `Sold` keeps the date, every other status clears it.
pub fn date_sold_for(status: InstanceStatus, date: Option<NaiveDate>) -> Option<DateTime> {
    match status {
        InstanceStatus::Sold => date.map(|d| {
            let at_midnight = d.and_time(chrono::NaiveTime::MIN).and_utc();
            DateTime::from_chrono(at_midnight)
        }),
        _ => None,
    }
}

/// Raw instance form submission. Untrusted until sanitized and validated.
///
/// All fields arrive as strings; references, status and date are coerced
/// by the validation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct KeyboardInstanceForm {
    /// Keyboard reference as a hex id.
    #[serde(default)]
    pub keyboard: String,

    /// Status label (`In-stock`, `Sold`, `Returned`).
    #[serde(default)]
    pub status: String,

    /// Switch reference as a hex id.
    #[serde(default)]
    pub keyboard_switch: String,

    /// Sale date as `YYYY-MM-DD`; meaningful only with status `Sold`.
    #[serde(default)]
    pub date_sold: String,
}

impl KeyboardInstanceForm {
    /// Trims and escapes every field for safe redisplay.
    pub fn sanitized(&self) -> Self {
        Self {
            keyboard: sanitize(&self.keyboard),
            status: sanitize(&self.status),
            keyboard_switch: sanitize(&self.keyboard_switch),
            date_sold: sanitize(&self.date_sold),
        }
    }

    /// Builds the document once validation has passed and every field has
    /// been coerced.
    pub fn into_instance(
        self,
        id: ObjectId,
        keyboard: ObjectId,
        keyboard_switch: ObjectId,
        status: InstanceStatus,
        date_sold: Option<NaiveDate>,
    ) -> KeyboardInstance {
        KeyboardInstance {
            id,
            keyboard,
            status,
            keyboard_switch,
            date_sold: date_sold_for(status, date_sold),
        }
    }
}

impl From<KeyboardInstance> for KeyboardInstanceForm {
    /// Pre-fills the update form from a stored document.
    fn from(instance: KeyboardInstance) -> Self {
        Self {
            keyboard: instance.keyboard.to_hex(),
            status: instance.status.label().to_string(),
            keyboard_switch: instance.keyboard_switch.to_hex(),
            date_sold: instance
                .date_sold
                .map(|d| d.to_chrono().format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Instance item for list and detail payloads, with references resolved
/// up to the brand.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeyboardInstanceItem {
    /// Document id as a hex string.
    pub id: String,
    /// Sale status label.
    pub status: String,
    /// Keyboard reference as a hex id.
    pub keyboard_id: String,
    /// Keyboard model name, when resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_name: Option<String>,
    /// Brand display name, when resolved through the keyboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    /// Switch display name, when resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_name: Option<String>,
    /// Formatted sale date, present only for sold units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_sold: Option<String>,
    /// Detail page path.
    pub url: String,
}

impl KeyboardInstanceItem {
    /// Builds an item, resolving names where the lookups succeeded.
    pub fn new(
        instance: KeyboardInstance,
        keyboard_name: Option<String>,
        brand_name: Option<String>,
        switch_name: Option<String>,
    ) -> Self {
        let url = instance.url();
        let date_sold = instance.date_sold_formatted();
        Self {
            id: instance.id.to_hex(),
            status: instance.status.label().to_string(),
            keyboard_id: instance.keyboard.to_hex(),
            keyboard_name,
            brand_name,
            switch_name,
            date_sold,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip() {
        for status in [
            InstanceStatus::InStock,
            InstanceStatus::Sold,
            InstanceStatus::Returned,
        ] {
            assert_eq!(InstanceStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(InstanceStatus::from_label("Lost"), None);
    }

    #[test]
    fn test_status_default_is_in_stock() {
        assert_eq!(InstanceStatus::default(), InstanceStatus::InStock);
    }

    #[test]
    fn test_status_order_matches_labels() {
        assert!(InstanceStatus::InStock < InstanceStatus::Returned);
        assert!(InstanceStatus::Returned < InstanceStatus::Sold);
    }

    #[test]
    fn test_date_sold_cleared_unless_sold() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 4);
        assert!(date_sold_for(InstanceStatus::Sold, date).is_some());
        assert!(date_sold_for(InstanceStatus::InStock, date).is_none());
        assert!(date_sold_for(InstanceStatus::Returned, date).is_none());
    }

    #[test]
    fn test_into_instance_honors_state_machine() {
        let form = KeyboardInstanceForm::default();
        let date = NaiveDate::from_ymd_opt(2026, 3, 4);
        let sold = form.clone().into_instance(
            ObjectId::new(),
            ObjectId::new(),
            ObjectId::new(),
            InstanceStatus::Sold,
            date,
        );
        assert!(sold.date_sold.is_some());

        let returned = form.into_instance(
            ObjectId::new(),
            ObjectId::new(),
            ObjectId::new(),
            InstanceStatus::Returned,
            date,
        );
        assert!(returned.date_sold.is_none());
    }
}
