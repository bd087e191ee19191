//! Application assembly: database, stores, storage, chat client, routes,
//! server startup.

pub mod database;
pub mod routes;
pub mod server;
pub mod stores;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use inkwell_chat::BotClient;
use inkwell_core::Config;
use inkwell_services::{ContentTransfer, RecordLifecycle, UploadFlow};

use crate::state::AppState;

/// Build every collaborator from configuration and assemble the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let stores = stores::create_stores(&config).await?;

    let storage = inkwell_storage::create_storage(&config)
        .await
        .context("Failed to initialize object storage")?;

    let chat: Arc<dyn inkwell_chat::ChatApi> = Arc::new(
        BotClient::new(config.chat_api_base.clone(), config.bot_token.clone())
            .context("Failed to build chat client")?,
    );

    let transfer = ContentTransfer::new(chat.clone(), storage.clone());
    let flow = UploadFlow::new(
        stores.sessions.clone(),
        stores.records.clone(),
        transfer,
        config.session_ttl(),
    );
    let lifecycle = RecordLifecycle::new(
        stores.records.clone(),
        stores.users.clone(),
        storage,
        config.bot_username.clone(),
    );

    let state = Arc::new(AppState {
        config,
        users: stores.users,
        chat,
        flow,
        lifecycle,
    });

    let router = routes::build_router(state.clone());
    Ok((state, router))
}
