//! Application state shared across handlers.

use std::sync::Arc;

use inkwell_chat::ChatApi;
use inkwell_core::Config;
use inkwell_db::UserStore;
use inkwell_services::{RecordLifecycle, UploadFlow};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub chat: Arc<dyn ChatApi>,
    pub flow: UploadFlow,
    pub lifecycle: RecordLifecycle,
}
