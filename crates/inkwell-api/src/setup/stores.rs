//! Store backend selection.

use std::sync::Arc;

use anyhow::Result;
use inkwell_core::{Config, StoreBackend};
use inkwell_db::{
    MemoryRecordStore, MemorySessionStore, MemoryUserStore, PgRecordStore, PgSessionStore,
    PgUserStore, RecordStore, SessionStore, UserStore,
};

pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub records: Arc<dyn RecordStore>,
}

/// Build the user/session/record stores for the configured backend.
pub async fn create_stores(config: &Config) -> Result<Stores> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let pool = super::database::setup_database(config).await?;
            Ok(Stores {
                users: Arc::new(PgUserStore::new(pool.clone())),
                sessions: Arc::new(PgSessionStore::new(pool.clone())),
                records: Arc::new(PgRecordStore::new(pool)),
            })
        }
        StoreBackend::Memory => {
            tracing::warn!(
                "Using in-memory stores: sessions and records will not survive a restart"
            );
            let users = MemoryUserStore::new();
            let records = MemoryRecordStore::with_user_counter(users.user_counter());
            Ok(Stores {
                users: Arc::new(users),
                sessions: Arc::new(MemorySessionStore::new()),
                records: Arc::new(records),
            })
        }
    }
}
