//! Business services: the upload session state machine, the content-transfer
//! pipeline, and the record lifecycle manager.
//!
//! Services hold their collaborators behind the store/storage/chat traits, so
//! the same logic runs against Postgres + S3 + the live chat platform or
//! against in-memory doubles in tests.

pub mod flow;
pub mod lifecycle;
pub mod transfer;

pub use flow::{FlowOutcome, FlowRejection, UploadFlow};
pub use lifecycle::{LifecycleOutcome, RecordLifecycle};
pub use transfer::{ContentTransfer, StoredContent, TransferError};
