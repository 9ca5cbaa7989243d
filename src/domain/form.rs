//! Field-level form errors shared by the address and product forms.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidationErrors;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validation failures in form order, keyed by wire (camelCase) field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Collects `errors` following `fields`, a list of `(struct_field, wire_field)` pairs in form order.
    /// Only the first message per field is kept; a `length` failure wins over format checks.
    pub fn from_validation(errors: &ValidationErrors, fields: &[(&'static str, &'static str)]) -> Self {
        let by_field = errors.field_errors();
        let collected = fields
            .iter()
            .filter_map(|&(name, wire)| {
                let list = by_field.get(name)?;
                let chosen = list.iter().find(|e| e.code == "length").or_else(|| list.first())?;
                let message = chosen.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| format!("{wire} is invalid"));
                Some(FieldError { field: wire, message })
            })
            .collect();
        Self(collected)
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError { field, message: message.into() }])
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        if !self.0.iter().any(|e| e.field == field) {
            self.0.push(FieldError { field, message: message.into() });
        }
    }

    /// Re-sorts errors added by hand so they follow `fields` like the derived ones.
    pub fn order_by(&mut self, fields: &[(&'static str, &'static str)]) {
        self.0.sort_by_key(|e| fields.iter().position(|(_, wire)| *wire == e.field).unwrap_or(usize::MAX));
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }
    /// The field the form should scroll to.
    pub fn first_field(&self) -> Option<&'static str> { self.0.first().map(|e| e.field) }
    pub fn get(&self, field: &str) -> Option<&str> { self.0.iter().find(|e| e.field == field).map(|e| e.message.as_str()) }
    pub fn to_map(&self) -> BTreeMap<&'static str, String> { self.0.iter().map(|e| (e.field, e.message.clone())).collect() }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
        write!(f, "{}", parts.join("; "))
    }
}
