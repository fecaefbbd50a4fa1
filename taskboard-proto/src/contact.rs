//! Contact model.
//!
//! Contacts are the people tasks get assigned to. A contact's color is
//! picked once, when it is created, and [`ContactPatch`] has no way to
//! change it afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{Collection, Entity};
use crate::validation::ValidationError;

/// Opaque contact identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(String);

impl ContactId {
    /// Wraps a store-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContactId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every field of a persisted contact except its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    /// Given name, never empty.
    pub firstname: String,
    /// Family name, never empty.
    pub lastname: String,
    /// Badge color (`#rrggbb`), fixed at creation.
    pub color: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
}

/// A persisted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-assigned identifier.
    pub id: ContactId,
    /// Current field values.
    pub fields: ContactFields,
}

impl Contact {
    /// Creates a contact from an id and its fields.
    #[must_use]
    pub const fn new(id: ContactId, fields: ContactFields) -> Self {
        Self { id, fields }
    }

    /// First and last name separated by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fields.firstname, self.fields.lastname)
    }

    /// Upper-case initials of first and last name, e.g. `"AM"`.
    #[must_use]
    pub fn initials(&self) -> String {
        [&self.fields.firstname, &self.fields.lastname]
            .iter()
            .filter_map(|name| name.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl Entity for Contact {
    type Id = ContactId;
    type Fields = ContactFields;
    type Patch = ContactPatch;

    const COLLECTION: Collection = Collection::Contacts;

    fn id(&self) -> &ContactId {
        &self.id
    }

    fn from_parts(id: ContactId, fields: ContactFields) -> Self {
        Self { id, fields }
    }

    fn apply_patch(&mut self, patch: &ContactPatch) {
        patch.apply_to(&mut self.fields);
    }
}

fn check_names(firstname: Option<&str>, lastname: Option<&str>) -> Result<(), ValidationError> {
    if firstname.is_some_and(|n| n.trim().is_empty()) {
        return Err(ValidationError::EmptyFirstname);
    }
    if lastname.is_some_and(|n| n.trim().is_empty()) {
        return Err(ValidationError::EmptyLastname);
    }
    Ok(())
}

/// User input for a new contact. The color is chosen by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
}

impl ContactDraft {
    /// Starts a draft from first and last name.
    pub fn new(firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            ..Self::default()
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Validates the draft and attaches the badge color.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyFirstname`] or
    /// [`ValidationError::EmptyLastname`] for blank names.
    pub fn validate(self, color: String) -> Result<ContactFields, ValidationError> {
        check_names(Some(&self.firstname), Some(&self.lastname))?;
        Ok(ContactFields {
            firstname: self.firstname,
            lastname: self.lastname,
            color,
            email: self.email,
            phone: self.phone,
        })
    }
}

/// Partial contact update. There is deliberately no color field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPatch {
    /// New given name.
    pub firstname: Option<String>,
    /// New family name.
    pub lastname: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New phone number, or `Some(None)` to remove it.
    pub phone: Option<Option<String>>,
}

impl ContactPatch {
    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.firstname.is_none()
            && self.lastname.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }

    /// Checks the invariants of every field the patch carries.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPatch`] for a patch with no fields,
    /// or a name error for a blank carried name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        check_names(self.firstname.as_deref(), self.lastname.as_deref())
    }

    /// Writes the carried fields into `fields`.
    pub fn apply_to(&self, fields: &mut ContactFields) {
        if let Some(firstname) = &self.firstname {
            fields.firstname.clone_from(firstname);
        }
        if let Some(lastname) = &self.lastname {
            fields.lastname.clone_from(lastname);
        }
        if let Some(email) = &self.email {
            fields.email.clone_from(email);
        }
        if let Some(phone) = &self.phone {
            fields.phone.clone_from(phone);
        }
    }
}
