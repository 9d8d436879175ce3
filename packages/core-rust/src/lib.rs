//! Admin gateway core: service identifiers, event envelopes, downstream payload
//! schemas, and request validators. Nothing in this crate performs I/O.

pub mod clock;
pub mod envelope;
pub mod messages;
pub mod service;
pub mod topics;
pub mod types;
pub mod validation;

pub use clock::{ClockSource, FixedClock, SystemClock};
pub use envelope::{EnvelopeBuilder, EventEnvelope, EventMetadata};
pub use service::{ParseServiceNameError, ServiceName};
pub use types::{Principal, ADMIN_ROLE};
