//! Mail transports for batch delivery.
//!
//! One `Transport` capability with two strategies, picked at assembly time:
//! - `DryRunTransport` logs each message instead of sending it
//! - `ResendTransport` delivers through the Resend HTTP API

pub mod dry_run;
pub mod error;
pub mod resend;
pub mod transport;

pub use dry_run::DryRunTransport;
pub use error::TransportError;
pub use resend::ResendTransport;
pub use transport::{Transport, select_transport};
