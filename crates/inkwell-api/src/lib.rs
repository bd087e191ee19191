//! Webhook API for the inkwell content-intake service.
//!
//! A single inbound endpoint receives platform event envelopes and routes
//! them through the action router into the upload state machine and the
//! record lifecycle manager; a read-only health endpoint reports aggregate
//! counts. Exposed as a library so integration tests can assemble the router
//! against in-memory stores.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use state::AppState;
