//! Payload schemas the gateway reads or produces.
//!
//! Downstream responses are forwarded as opaque JSON except where the gateway
//! has to make a decision on them (payment status before a saga event). Those
//! few shapes, the inbound admin request bodies, and the saga event payloads
//! live here. All structs use camelCase field names to match the services on
//! the other side of the wire.

pub mod events;
pub mod payment;
pub mod user;

pub use events::{PaymentFailedEvent, PaymentProcessedEvent};
pub use payment::{FailPaymentRequest, PaymentRecord, PaymentRecordError, PaymentStatus};
pub use user::{Field, ResetPasswordRequest, UserUpdate, UserUpdateError};
