//! Validation pipeline helpers.
//!
//! All rules for one submission run before any failure refuses the
//! write; violations accumulate into a single ordered message list that
//! the form view re-renders alongside the sanitized values.

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use validator::Validate;

/// Collects field violations for one form submission.
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the declarative rules of a `Validate` form and records every
    /// failure. Fields are visited in name order so the output is stable.
    pub fn check(&mut self, form: &impl Validate) {
        if let Err(errors) = form.validate() {
            let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
            fields.sort_by_key(|(field, _)| field.to_string());
            for (field, field_errors) in fields {
                for error in field_errors {
                    match &error.message {
                        Some(message) => self.messages.push(message.to_string()),
                        None => self.messages.push(format!("Invalid value for {}", field)),
                    }
                }
            }
        }
    }

    /// Coerces a required reference field to an ObjectId.
    pub fn object_id(&mut self, field: &str, value: &str) -> Option<ObjectId> {
        match ObjectId::parse_str(value) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(format!("{} must reference an existing record", field));
                None
            }
        }
    }

    /// Coerces a required integer field with a lower bound.
    pub fn integer_min(&mut self, field: &str, value: &str, min: i64) -> Option<i64> {
        match value.parse::<i64>() {
            Ok(n) if n >= min => Some(n),
            Ok(_) => {
                self.push(format!("{} must be at least {}", field, min));
                None
            }
            Err(_) => {
                self.push(format!("{} must be an integer", field));
                None
            }
        }
    }

    /// Coerces an optional ISO (`YYYY-MM-DD`) date field. Empty input is
    /// absent, not a violation.
    pub fn iso_date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        if value.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.push(format!("{} must be a date in YYYY-MM-DD format", field));
                None
            }
        }
    }

    /// Records a violation message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the collector, yielding the full violation list.
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_coercion() {
        let mut violations = Violations::new();
        let id = ObjectId::new();
        assert_eq!(violations.object_id("brand", &id.to_hex()), Some(id));
        assert!(violations.is_empty());

        assert_eq!(violations.object_id("brand", "not-an-id"), None);
        assert_eq!(violations.into_messages().len(), 1);
    }

    #[test]
    fn test_integer_min_rejects_below_bound() {
        let mut violations = Violations::new();
        assert_eq!(violations.integer_min("price", "145", 1), Some(145));
        assert_eq!(violations.integer_min("price", "0", 1), None);
        assert_eq!(violations.integer_min("price", "cheap", 1), None);
        let messages = violations.into_messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("at least 1"));
        assert!(messages[1].contains("integer"));
    }

    #[test]
    fn test_iso_date_empty_is_absent() {
        let mut violations = Violations::new();
        assert_eq!(violations.iso_date("date_sold", ""), None);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_iso_date_malformed_is_a_violation() {
        let mut violations = Violations::new();
        assert_eq!(violations.iso_date("date_sold", "04/03/2026"), None);
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_all_rules_run_before_refusal() {
        // Two bad fields must yield two messages, not one.
        let mut violations = Violations::new();
        violations.object_id("keyboard", "nope");
        violations.integer_min("price", "-3", 1);
        assert_eq!(violations.into_messages().len(), 2);
    }
}
