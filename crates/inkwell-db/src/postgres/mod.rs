//! Postgres store implementations.
//!
//! One repository per entity, each a cheap `Clone` over the shared pool.
//! Queries are runtime sqlx queries; failures map into the session-store /
//! record-store error taxonomy at this boundary.

mod records;
mod sessions;
mod users;

pub use records::PgRecordStore;
pub use sessions::PgSessionStore;
pub use users::PgUserStore;
