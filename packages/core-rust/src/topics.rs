//! Topic names for events the gateway publishes.
//!
//! The order-fulfillment saga subscribes to these; renaming one breaks it.

/// Admin confirmed a payment; advances the saga.
pub const PAYMENT_PROCESSED: &str = "payment.processed";

/// Admin marked a payment as failed; triggers compensation.
pub const PAYMENT_FAILED: &str = "payment.failed";
