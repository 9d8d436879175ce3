//! Bearer-token authentication for the admin API.
//!
//! [`require_admin`] verifies the JWT, checks for the `admin` role, and leaves
//! an [`AdminUser`] in the request extensions for handlers. The raw token is
//! kept so it can be forwarded to downstream services.

use std::fmt;
use std::sync::Arc;

use admin_gateway_core::{Principal, ADMIN_ROLE};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::error::ApiError;

/// Default expected `iss` claim.
pub const DEFAULT_JWT_ISSUER: &str = "xshopai-auth-service";
/// Default expected `aud` claim.
pub const DEFAULT_JWT_AUDIENCE: &str = "xshopai-services";

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized: Missing Authorization header")]
    MissingHeader,

    #[error("Unauthorized: Authorization header must start with Bearer")]
    NotBearer,

    #[error("Unauthorized: Missing token")]
    MissingToken,

    #[error("Unauthorized: Invalid or expired token")]
    InvalidToken,

    #[error("Forbidden: Required roles: {}. User has: {}", ADMIN_ROLE, .held.join(", "))]
    MissingRole { held: Vec<String> },
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingRole { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// HS256 verification against the configured issuer and audience.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not demanded.
        validation.required_spec_claims.clear();
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decodes the `{id, email, roles}` claims of a valid token.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] for a bad signature, wrong issuer or
    /// audience, expiry, or malformed claims.
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        decode::<Principal>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            })
    }
}

/// The authenticated administrator of the current request.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub principal: Principal,
    /// Raw bearer token, forwarded to downstream services.
    pub token: String,
}

/// Extracts the token from an `Authorization: Bearer ...` header.
///
/// # Errors
///
/// [`AuthError::MissingHeader`], [`AuthError::NotBearer`], or
/// [`AuthError::MissingToken`] depending on what is wrong with the header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::NotBearer)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::NotBearer)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Authenticates the request and requires the `admin` role.
///
/// # Errors
///
/// Any [`AuthError`], answered as 401 or 403.
pub async fn require_admin(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?.to_string();
    let principal = verifier.verify(&token)?;

    if !principal.has_role(ADMIN_ROLE) {
        return Err(AuthError::MissingRole {
            held: principal.roles.clone(),
        }
        .into());
    }

    request.extensions_mut().insert(AdminUser { principal, token });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn mint(claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET, DEFAULT_JWT_ISSUER, DEFAULT_JWT_AUDIENCE)
    }

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_errors() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingHeader));
        assert_eq!(bearer_token(&headers_with("Basic abc")), Err(AuthError::NotBearer));
        assert_eq!(bearer_token(&headers_with("Bearer ")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Ok("abc.def"));
    }

    #[test]
    fn verifies_valid_token() {
        let token = mint(&json!({
            "id": "507f1f77bcf86cd799439011",
            "email": "admin@xshopai.com",
            "roles": ["admin"],
            "iss": DEFAULT_JWT_ISSUER,
            "aud": DEFAULT_JWT_AUDIENCE,
            "exp": exp(),
        }));

        let principal = verifier().verify(&token).unwrap();
        assert_eq!(principal.id, "507f1f77bcf86cd799439011");
        assert!(principal.has_role(ADMIN_ROLE));
    }

    #[test]
    fn expiry_is_optional_but_enforced_when_present() {
        let claims = |exp: Option<i64>| {
            let mut claims = json!({
                "id": "u1", "roles": ["admin"],
                "iss": DEFAULT_JWT_ISSUER, "aud": DEFAULT_JWT_AUDIENCE,
            });
            if let Some(exp) = exp {
                claims["exp"] = json!(exp);
            }
            claims
        };

        assert!(verifier().verify(&mint(&claims(None))).is_ok());

        let expired = chrono::Utc::now().timestamp() - 3600;
        assert_eq!(
            verifier().verify(&mint(&claims(Some(expired)))),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn rejects_wrong_audience_and_secret() {
        let wrong_aud = mint(&json!({
            "id": "u1", "roles": ["admin"],
            "iss": DEFAULT_JWT_ISSUER, "aud": "someone-else", "exp": exp(),
        }));
        assert_eq!(verifier().verify(&wrong_aud), Err(AuthError::InvalidToken));

        let other = TokenVerifier::new("other-secret", DEFAULT_JWT_ISSUER, DEFAULT_JWT_AUDIENCE);
        let token = mint(&json!({
            "id": "u1", "roles": ["admin"],
            "iss": DEFAULT_JWT_ISSUER, "aud": DEFAULT_JWT_AUDIENCE, "exp": exp(),
        }));
        assert_eq!(other.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn missing_role_message_lists_held_roles() {
        let err = AuthError::MissingRole {
            held: vec!["customer".into(), "vendor".into()],
        };
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "Forbidden: Required roles: admin. User has: customer, vendor"
        );
    }
}
