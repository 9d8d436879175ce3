//! `/api/admin/users` handlers.
//!
//! Identifier and payload checks run before any downstream call.

use admin_gateway_core::messages::{ResetPasswordRequest, UserUpdate, UserUpdateError};
use admin_gateway_core::validation::is_valid_object_id;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::Value;
use tracing::{error, info};

use super::{optional_json, passthrough, AppState};
use crate::clients::ClientError;
use crate::invoke::InvocationError;
use crate::network::auth::AdminUser;
use crate::network::error::{downstream_message, ApiError};

const INVALID_USER_ID: &str = "Invalid user ID";
const VALID_EMAIL_REQUIRED: &str = "Valid email is required";
const RESET_FAILED: &str = "Failed to trigger password reset";

fn check_user_id(id: &str) -> Result<(), ApiError> {
    if is_valid_object_id(id) {
        Ok(())
    } else {
        Err(ApiError::Validation(INVALID_USER_ID.to_string()))
    }
}

/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
) -> Result<Json<Value>, ApiError> {
    let users = state.clients.users.fetch_all_users(Some(&admin.token)).await?;
    Ok(passthrough(users))
}

/// `GET /api/admin/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    check_user_id(&id)?;
    let user = state
        .clients
        .users
        .fetch_user_by_id(&id, Some(&admin.token))
        .await?;
    Ok(passthrough(user))
}

/// `PATCH /api/admin/users/{id}`
///
/// The body is validated field by field and then forwarded unchanged.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    check_user_id(&id)?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::Validation(UserUpdateError::Payload.to_string()))?;
    UserUpdate::from_value(&payload)
        .and_then(|update| update.validate())
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    info!(actor_id = %admin.principal.id, target_id = %id, "admin updating user");

    let updated = state
        .clients
        .users
        .update_user_by_id(&id, payload, Some(&admin.token))
        .await?;
    Ok(passthrough(updated))
}

/// `DELETE /api/admin/users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    check_user_id(&id)?;
    if admin.principal.id == id {
        return Err(ApiError::Forbidden(
            "Admins cannot delete their own account.".to_string(),
        ));
    }

    info!(actor_id = %admin.principal.id, target_id = %id, "admin deleting user");

    state
        .clients
        .users
        .remove_user_by_id(&id, Some(&admin.token))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/users/{id}/reset-password`
///
/// Downstream failures keep their status; the message is the downstream
/// `message` when there is one.
pub async fn reset_user_password(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    check_user_id(&id)?;

    let request: ResetPasswordRequest = optional_json(&body, VALID_EMAIL_REQUIRED)?;
    let email = request
        .valid_email()
        .ok_or_else(|| ApiError::Validation(VALID_EMAIL_REQUIRED.to_string()))?;

    info!(actor_id = %admin.principal.id, target_id = %id, "admin triggering password reset");

    match state
        .clients
        .auth
        .trigger_password_reset(email, Some(&admin.token))
        .await
    {
        Ok(result) => Ok(passthrough(result)),
        Err(ClientError::MissingCredential) => Err(ClientError::MissingCredential.into()),
        Err(ClientError::Invocation(e)) => {
            error!(
                actor_id = %admin.principal.id,
                target_id = %id,
                error = %e,
                "failed to trigger password reset"
            );
            Err(match &e {
                InvocationError::Status { status, body, .. } => ApiError::Upstream {
                    status: *status,
                    message: downstream_message(body).unwrap_or_else(|| RESET_FAILED.to_string()),
                },
                _ => ApiError::Internal(RESET_FAILED.to_string()),
            })
        }
    }
}
