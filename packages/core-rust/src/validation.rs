//! Request-field predicates run before any outbound call.
//!
//! All checks are pure and return `bool`; the HTTP layer turns a `false` into
//! a 400 with a field-specific message.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Roles the user service accepts.
pub const KNOWN_ROLES: [&str; 5] = ["customer", "admin", "vendor", "manager", "support"];

/// Minimum password length accepted on admin-initiated updates.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum password length (bcrypt truncates beyond 72 bytes).
pub const MAX_PASSWORD_LEN: usize = 72;

static OBJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("object id pattern compiles"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// 24 hexadecimal characters, the shape of a user id.
#[must_use]
pub fn is_valid_object_id(id: &str) -> bool {
    OBJECT_ID.is_match(id)
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL.is_match(email)
}

/// Length within bounds and at least one letter and one digit.
#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    let len = password.chars().count();
    (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len)
        && password.chars().any(char::is_alphabetic)
        && password.chars().any(|c| c.is_ascii_digit())
}

/// A non-empty array of known role names.
#[must_use]
pub fn is_valid_roles(roles: &Value) -> bool {
    roles.as_array().is_some_and(|items| {
        !items.is_empty()
            && items
                .iter()
                .all(|r| r.as_str().is_some_and(|r| KNOWN_ROLES.contains(&r)))
    })
}

/// Strictly a JSON boolean; `"true"` or `1` are rejected.
#[must_use]
pub fn is_valid_is_active(value: &Value) -> bool {
    value.is_boolean()
}
