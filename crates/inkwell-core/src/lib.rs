//! Core domain types for the inkwell content-intake service.
//!
//! This crate holds the domain models, the unified error type, configuration,
//! the static folder/category taxonomy, and the action-string codec. It has no
//! knowledge of HTTP, the chat platform, or any storage backend.

pub mod action;
pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod taxonomy;

pub use action::{Action, ActionParseError};
pub use config::Config;
pub use error::AppError;
pub use storage_types::{StorageBackend, StoreBackend};
