use serde::{Deserialize, Serialize};

/// Role every caller of the admin API must hold.
pub const ADMIN_ROLE: &str = "admin";

/// Authenticated caller, decoded from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier for the authenticated user.
    pub id: String,
    /// E-mail claim, when the token carries one.
    #[serde(default)]
    pub email: Option<String>,
    /// Roles assigned to this principal for authorization checks.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    /// True when the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: &[&str]) -> Principal {
        Principal {
            id: "u-1".to_string(),
            email: None,
            roles: roles.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn has_role_checks_membership() {
        let p = principal(&["customer", "admin"]);
        assert!(p.has_role(ADMIN_ROLE));
        assert!(!p.has_role("manager"));
    }

    #[test]
    fn no_roles_means_no_admin() {
        assert!(!principal(&[]).has_role(ADMIN_ROLE));
    }

    #[test]
    fn roles_default_to_empty_when_absent() {
        let p: Principal = serde_json::from_str(r#"{"id":"u-9"}"#).unwrap();
        assert!(p.roles.is_empty());
        assert!(p.email.is_none());
    }
}
