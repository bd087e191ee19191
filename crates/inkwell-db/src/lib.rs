//! Persistence layer: store contracts plus their backends.
//!
//! The `SessionStore`/`RecordStore`/`UserStore` traits are the capability
//! boundary the state machine and lifecycle manager are written against; the
//! `postgres` module implements them over sqlx and the `memory` module over
//! in-process maps (local development and tests). Workflow truth always lives
//! behind these traits, never in process-lifetime memory of the caller.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::{MemoryRecordStore, MemorySessionStore, MemoryUserStore};
pub use postgres::{PgRecordStore, PgSessionStore, PgUserStore};
pub use traits::{RecordStore, SessionStore, UserStore};
