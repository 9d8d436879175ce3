//! Admin request bodies for user management.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::validation;

/// An optional request field that distinguishes "absent" from "present".
///
/// `{"isActive": null}` is `Present(Value::Null)`, not `Absent`; a field the
/// caller sent must be validated even if its value is falsy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    #[must_use]
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Field::Present)
    }
}

/// Rejection reasons for a user update, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UserUpdateError {
    #[error("Invalid update payload")]
    Payload,
    #[error("Invalid roles")]
    Roles,
    #[error("Invalid isActive value")]
    IsActive,
    #[error("Invalid email")]
    Email,
    #[error("Invalid password")]
    Password,
}

/// Body of `PATCH /api/admin/users/{id}`.
///
/// Every updatable field is a [`Field`]; unrecognised keys are collected in
/// `unknown` so the payload check can reject them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserUpdate {
    pub first_name: Field<Value>,
    pub last_name: Field<Value>,
    pub email: Field<Value>,
    pub phone_number: Field<Value>,
    pub password: Field<Value>,
    pub roles: Field<Value>,
    pub is_active: Field<Value>,
    pub is_email_verified: Field<Value>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl UserUpdate {
    /// Parses a raw request body. Non-objects are a payload error.
    ///
    /// # Errors
    ///
    /// Returns [`UserUpdateError::Payload`] when `body` is not a JSON object.
    pub fn from_value(body: &Value) -> Result<Self, UserUpdateError> {
        if !body.is_object() {
            return Err(UserUpdateError::Payload);
        }
        Self::deserialize(body).map_err(|_| UserUpdateError::Payload)
    }

    fn known_fields(&self) -> [&Field<Value>; 8] {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone_number,
            &self.password,
            &self.roles,
            &self.is_active,
            &self.is_email_verified,
        ]
    }

    /// Runs the update checks in order and reports the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`UserUpdateError`] that applies.
    pub fn validate(&self) -> Result<(), UserUpdateError> {
        let any_known = self.known_fields().iter().any(|f| f.is_present());
        if !any_known || !self.unknown.is_empty() {
            return Err(UserUpdateError::Payload);
        }
        if let Some(roles) = self.roles.as_present() {
            if !validation::is_valid_roles(roles) {
                return Err(UserUpdateError::Roles);
            }
        }
        if let Some(active) = self.is_active.as_present() {
            if !validation::is_valid_is_active(active) {
                return Err(UserUpdateError::IsActive);
            }
        }
        if let Some(email) = self.email.as_present() {
            if !email.as_str().is_some_and(validation::is_valid_email) {
                return Err(UserUpdateError::Email);
            }
        }
        if let Some(password) = self.password.as_present() {
            if !password.as_str().is_some_and(validation::is_valid_password) {
                return Err(UserUpdateError::Password);
            }
        }
        Ok(())
    }
}

/// Body of `POST /api/admin/users/{id}/reset-password`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
}

impl ResetPasswordRequest {
    /// The e-mail when present and well-formed.
    #[must_use]
    pub fn valid_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|e| validation::is_valid_email(e))
    }
}
