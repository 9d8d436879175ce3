//! Saga event payloads published by the gateway.
//!
//! These become the `data` field of an [`EventEnvelope`](crate::EventEnvelope).
//! `traceId` is carried inside the payload so the envelope builder can lift
//! it into `metadata`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payment::PaymentRecord;

/// Published on `payment.processed` when an admin confirms a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProcessedEvent {
    pub order_id: String,
    pub payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub amount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub currency: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_method: Option<Value>,
    /// Id of the admin who confirmed the payment.
    pub processed_by: String,
    /// ISO-8601 timestamp of the confirmation.
    pub processed_at: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace_id: Option<String>,
}

impl PaymentProcessedEvent {
    #[must_use]
    pub fn from_record(
        order_id: &str,
        payment: &PaymentRecord,
        admin_id: &str,
        at: String,
        trace_id: Option<String>,
    ) -> Self {
        Self {
            order_id: order_id.to_string(),
            payment_id: payment.id.clone(),
            amount: payment.amount.clone(),
            currency: payment.currency.clone(),
            payment_method: payment.payment_method.clone(),
            processed_by: admin_id.to_string(),
            processed_at: at,
            trace_id,
        }
    }
}

/// Published on `payment.failed` when an admin fails a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailedEvent {
    pub order_id: String,
    pub payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub amount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub currency: Option<Value>,
    pub reason: String,
    pub failed_by: String,
    pub failed_at: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace_id: Option<String>,
}

impl PaymentFailedEvent {
    #[must_use]
    pub fn from_record(
        order_id: &str,
        payment: &PaymentRecord,
        reason: &str,
        admin_id: &str,
        at: String,
        trace_id: Option<String>,
    ) -> Self {
        Self {
            order_id: order_id.to_string(),
            payment_id: payment.id.clone(),
            amount: payment.amount.clone(),
            currency: payment.currency.clone(),
            reason: reason.to_string(),
            failed_by: admin_id.to_string(),
            failed_at: at,
            trace_id,
        }
    }
}
