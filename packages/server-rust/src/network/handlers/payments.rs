//! Order payment handlers, including the two saga-advancing actions.
//!
//! Confirming or failing a payment publishes `payment.processed` or
//! `payment.failed`. A publish that does not reach the broker fails the
//! request with 500: the operator has to know the saga did not move.

use admin_gateway_core::messages::{
    FailPaymentRequest, PaymentFailedEvent, PaymentProcessedEvent, PaymentRecord,
};
use admin_gateway_core::topics::{PAYMENT_FAILED, PAYMENT_PROCESSED};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{error, info};

use super::{optional_json, passthrough, AppState};
use crate::network::auth::AdminUser;
use crate::network::error::ApiError;
use crate::network::middleware::request_id;

const PAYMENT_NOT_FOUND: &str = "Payment not found for this order";

/// Looks up the order's payment; "no payment" is a 404 here.
async fn find_payment(
    state: &AppState,
    order_id: &str,
    token: &str,
) -> Result<PaymentRecord, ApiError> {
    let raw = state
        .clients
        .payments
        .fetch_payment_by_order_id(order_id, Some(token))
        .await?
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::NotFound(PAYMENT_NOT_FOUND.to_string()))?;

    PaymentRecord::from_value(&raw).map_err(|e| {
        error!(order_id, error = %e, "payment service returned an unreadable payment");
        ApiError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            message: "Unexpected payment record from payment service".to_string(),
        }
    })
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /api/admin/orders/{id}/payment`
pub async fn get_order_payment(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let payment = state
        .clients
        .payments
        .fetch_payment_by_order_id(&order_id, Some(&admin.token))
        .await?
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::NotFound(PAYMENT_NOT_FOUND.to_string()))?;
    Ok(passthrough(Some(payment)))
}

/// `POST /api/admin/orders/{id}/confirm-payment`
pub async fn confirm_order_payment(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let payment = find_payment(&state, &order_id, &admin.token).await?;

    if !payment.status.can_confirm() {
        return Err(ApiError::Validation(format!(
            "Cannot confirm payment with status '{}'",
            payment.status.as_str()
        )));
    }

    let trace_id = request_id(&headers);
    let event = PaymentProcessedEvent::from_record(
        &order_id,
        &payment,
        &admin.principal.id,
        now_iso(),
        trace_id.clone(),
    );
    let payload = serde_json::to_value(&event)
        .map_err(|e| ApiError::Internal(format!("Failed to encode payment event: {e}")))?;

    let envelope = state
        .publisher
        .deliver(PAYMENT_PROCESSED, payload, trace_id.as_deref())
        .await
        .map_err(|e| {
            ApiError::Internal(format!("Failed to publish payment confirmation: {e}"))
        })?;

    info!(
        actor_id = %admin.principal.id,
        order_id = %order_id,
        payment_id = %payment.id,
        event_id = %envelope.event_id,
        "payment confirmed by admin"
    );

    Ok(Json(json!({
        "success": true,
        "data": {
            "orderId": order_id,
            "paymentId": payment.id,
            "status": "confirmed",
            "eventId": envelope.event_id,
        },
    })))
}

/// `POST /api/admin/orders/{id}/fail-payment` with an optional
/// `{"reason": "..."}` body.
pub async fn fail_order_payment(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: FailPaymentRequest = optional_json(&body, "Invalid fail-payment payload")?;
    let reason = request.reason_or_default().to_string();

    let payment = find_payment(&state, &order_id, &admin.token).await?;

    if !payment.status.can_fail() {
        return Err(ApiError::Validation(format!(
            "Cannot fail payment with status '{}'",
            payment.status.as_str()
        )));
    }

    let trace_id = request_id(&headers);
    let event = PaymentFailedEvent::from_record(
        &order_id,
        &payment,
        &reason,
        &admin.principal.id,
        now_iso(),
        trace_id.clone(),
    );
    let payload = serde_json::to_value(&event)
        .map_err(|e| ApiError::Internal(format!("Failed to encode payment event: {e}")))?;

    let envelope = state
        .publisher
        .deliver(PAYMENT_FAILED, payload, trace_id.as_deref())
        .await
        .map_err(|e| {
            ApiError::Internal(format!(
                "Failed to publish payment failure (reason: {reason}): {e}"
            ))
        })?;

    info!(
        actor_id = %admin.principal.id,
        order_id = %order_id,
        payment_id = %payment.id,
        event_id = %envelope.event_id,
        reason = %reason,
        "payment failed by admin"
    );

    Ok(Json(json!({
        "success": true,
        "data": {
            "orderId": order_id,
            "paymentId": payment.id,
            "status": "failed",
            "reason": reason,
            "eventId": envelope.event_id,
        },
    })))
}
