pub mod record;
pub mod session;
pub mod user;

pub use record::{Record, RecordResponse, ServiceStats};
pub use session::{Draft, SessionPatch, SessionState, UploadSession};
pub use user::User;
