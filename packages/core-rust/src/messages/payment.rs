//! Payment records as returned by the payment service.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a payment.
///
/// Unknown states are kept verbatim in [`PaymentStatus::Other`] so a newer
/// payment service never makes the gateway reject a record outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Refunded,
    Cancelled,
    Other(String),
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Other(s) => s,
        }
    }

    /// Whether an admin may confirm a payment in this state.
    ///
    /// A payment that already failed, was refunded, or was cancelled cannot
    /// advance the saga.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        !matches!(
            self,
            PaymentStatus::Failed | PaymentStatus::Refunded | PaymentStatus::Cancelled
        )
    }

    /// Whether an admin may mark a payment in this state as failed.
    #[must_use]
    pub fn can_fail(&self) -> bool {
        !matches!(self, PaymentStatus::Succeeded | PaymentStatus::Refunded)
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "processing" => PaymentStatus::Processing,
            "succeeded" | "success" | "completed" => PaymentStatus::Succeeded,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            "cancelled" | "canceled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A payment as reported by `GET api/payments/order/{orderId}`.
///
/// Only the id and status are decoded strictly: they decide whether the saga
/// may advance. Everything else is carried through as the payment service
/// sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub id: String,
    pub order_id: Option<String>,
    pub status: PaymentStatus,
    pub amount: Option<Value>,
    pub currency: Option<Value>,
    pub payment_method: Option<Value>,
}

/// Why a payment service response could not be read as a [`PaymentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentRecordError {
    #[error("payment record is not a JSON object")]
    NotAnObject,
    #[error("payment record has no id")]
    MissingId,
    #[error("payment record has no status")]
    MissingStatus,
}

/// Id keys in lookup order.
const ID_KEYS: [&str; 3] = ["id", "_id", "paymentId"];

impl PaymentRecord {
    /// Reads a record from the payment service's JSON.
    ///
    /// The id is the first of `id`, `_id`, `paymentId` holding a non-empty
    /// string or a number.
    ///
    /// # Errors
    ///
    /// Fails when `raw` is not an object or lacks a usable id or status.
    pub fn from_value(raw: &Value) -> Result<Self, PaymentRecordError> {
        let fields = raw.as_object().ok_or(PaymentRecordError::NotAnObject)?;

        let id = ID_KEYS
            .iter()
            .find_map(|key| match fields.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .ok_or(PaymentRecordError::MissingId)?;

        let status = fields
            .get("status")
            .and_then(Value::as_str)
            .map(|s| PaymentStatus::from(s.to_string()))
            .ok_or(PaymentRecordError::MissingStatus)?;

        Ok(Self {
            id,
            order_id: fields.get("orderId").and_then(Value::as_str).map(str::to_string),
            status,
            amount: present(fields, "amount"),
            currency: present(fields, "currency"),
            payment_method: present(fields, "paymentMethod"),
        })
    }
}

fn present(fields: &Map<String, Value>, key: &str) -> Option<Value> {
    fields.get(key).filter(|v| !v.is_null()).cloned()
}

/// Body of `POST /api/admin/orders/{id}/fail-payment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailPaymentRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

impl FailPaymentRequest {
    /// Reason recorded when the admin gives none.
    pub const DEFAULT_REASON: &'static str = "Payment marked as failed by admin";

    /// The admin's reason, or [`Self::DEFAULT_REASON`] when blank.
    #[must_use]
    pub fn reason_or_default(&self) -> &str {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(Self::DEFAULT_REASON)
    }
}
