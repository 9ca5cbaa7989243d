//! Saved shipping addresses for one customer

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::domain::form::FieldErrors;

/// Indian mobile number, optionally prefixed with `+91`.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+91)?[6-9][0-9]{9}$").expect("phone pattern compiles"));
/// Six-digit PIN code.
static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("PIN code pattern compiles"));

/// Form order of the address fields, as `(struct field, wire field)`.
const ADDRESS_FIELDS: &[(&str, &str)] = &[
    ("full_name", "fullName"),
    ("phone", "phone"),
    ("email", "email"),
    ("address", "address"),
    ("city", "city"),
    ("state", "state"),
    ("zip_code", "zipCode"),
    ("country", "country"),
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub id: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Phone number is required"), regex(path = "PHONE_RE", message = "Enter a valid 10-digit mobile number"))]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "PIN code is required"), regex(path = "ZIP_RE", message = "Enter a valid 6-digit PIN code"))]
    pub zip_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    pub is_default: bool,
}

impl Address {
    /// Trims every field, strips separators from the phone number and drops an empty email.
    pub fn normalized(mut self) -> Self {
        for field in [&mut self.full_name, &mut self.address, &mut self.city, &mut self.state, &mut self.zip_code, &mut self.country] {
            *field = field.trim().to_string();
        }
        self.phone = self.phone.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
        self.email = self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        self
    }

    /// Checks the form; the returned errors are in form order.
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|e| FieldErrors::from_validation(&e, ADDRESS_FIELDS))
    }

    /// Single-line rendering used in emails and order summaries.
    pub fn one_line(&self) -> String {
        [self.address.as_str(), self.city.as_str(), self.state.as_str(), self.zip_code.as_str(), self.country.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressBookError {
    #[error("Invalid address: {0}")]
    Invalid(FieldErrors),
    #[error("Address not found: {0}")]
    NotFound(String),
}

/// The `profile_<userId>` entry: a customer's saved addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    pub fn new() -> Self { Self::default() }
    pub fn addresses(&self) -> &[Address] { &self.addresses }
    pub fn is_empty(&self) -> bool { self.addresses.is_empty() }
    pub fn get(&self, id: &str) -> Option<&Address> { self.addresses.iter().find(|a| a.id == id) }
    pub fn default_address(&self) -> Option<&Address> { self.addresses.iter().find(|a| a.is_default) }

    /// Creates (empty id) or replaces (known id) an address after validating it.
    pub fn save(&mut self, address: Address) -> Result<Address, AddressBookError> {
        let mut address = address.normalized();
        address.check().map_err(AddressBookError::Invalid)?;

        if self.addresses.is_empty() { address.is_default = true; }
        if address.id.is_empty() {
            address.id = Uuid::new_v4().to_string();
            self.addresses.push(address.clone());
        } else {
            let slot = self.addresses.iter_mut().find(|a| a.id == address.id).ok_or_else(|| AddressBookError::NotFound(address.id.clone()))?;
            *slot = address.clone();
        }
        self.settle_default(address.is_default.then_some(address.id.as_str()));
        Ok(self.get(&address.id).cloned().unwrap_or(address))
    }

    pub fn delete(&mut self, id: &str) -> Result<Address, AddressBookError> {
        let idx = self.addresses.iter().position(|a| a.id == id).ok_or_else(|| AddressBookError::NotFound(id.to_string()))?;
        let removed = self.addresses.remove(idx);
        self.settle_default(None);
        Ok(removed)
    }

    pub fn set_default(&mut self, id: &str) -> Result<(), AddressBookError> {
        if self.get(id).is_none() { return Err(AddressBookError::NotFound(id.to_string())); }
        self.settle_default(Some(id));
        Ok(())
    }

    /// Leaves exactly one default when the book is non-empty: `preferred` if given,
    /// else the existing first default, else the first address.
    fn settle_default(&mut self, preferred: Option<&str>) {
        let keep = preferred
            .map(str::to_string)
            .or_else(|| self.default_address().map(|a| a.id.clone()))
            .or_else(|| self.addresses.first().map(|a| a.id.clone()));
        for address in &mut self.addresses {
            address.is_default = keep.as_deref() == Some(address.id.as_str());
        }
    }
}
