//! Inbound webhook: envelope classification and action dispatch.
//!
//! One endpoint receives every platform event. Processing failures are
//! caught here, logged, converted to a user-facing chat message when a chat
//! id is known, and answered 200 so the platform does not retry-storm; only
//! a wrong webhook secret is refused outright. Every action handler
//! re-validates its target, since buttons outlive the sessions and records
//! they were rendered for.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inkwell_chat::{CallbackQuery, InlineButton, InlineKeyboard, Message, Update};
use inkwell_core::models::{Record, User};
use inkwell_core::{Action, AppError};
use inkwell_services::{FlowOutcome, FlowRejection, LifecycleOutcome};

use crate::error::HttpAppError;
use crate::state::AppState;

const UNRECOGNIZED_ACTION: &str = "Unrecognized action. It may belong to an older menu.";
const SESSION_EXPIRED: &str = "This upload session has expired. Send /upload to start again.";
const NOT_AN_ADMIN: &str = "Only administrators can do that.";

pub async fn receive_update(
    State(state): State<Arc<AppState>>,
    Path(secret): Path<String>,
    Json(update): Json<Update>,
) -> Result<StatusCode, HttpAppError> {
    if secret != state.config.webhook_secret {
        return Err(AppError::Unauthorized("invalid webhook secret".to_string()).into());
    }

    if let Err(err) = process_update(&state, &update).await {
        tracing::error!(
            update_id = update.update_id,
            error = %err,
            code = err.error_code(),
            "Update processing failed"
        );
        if let Some(chat_id) = reply_chat_id(&update) {
            let text = failure_reply(&err);
            if let Err(send_err) = state.chat.send_message(chat_id, &text).await {
                tracing::warn!(chat_id, error = %send_err, "Failed to deliver failure message");
            }
        }
    }

    Ok(StatusCode::OK)
}

fn reply_chat_id(update: &Update) -> Option<i64> {
    if let Some(message) = &update.message {
        Some(message.chat.id)
    } else {
        update.callback_query.as_ref().map(|cb| cb.chat_id())
    }
}

fn failure_reply(err: &AppError) -> String {
    match err {
        AppError::Transfer(_) => format!(
            "{}. The upload was closed; send /upload to try again.",
            err.client_message()
        ),
        _ => format!("{}. Please try again.", err.client_message()),
    }
}

async fn process_update(state: &Arc<AppState>, update: &Update) -> Result<(), AppError> {
    if let Some(callback) = &update.callback_query {
        handle_callback(state, callback).await
    } else if let Some(message) = &update.message {
        handle_message(state, message).await
    } else {
        tracing::debug!(update_id = update.update_id, "Ignoring unsupported update kind");
        Ok(())
    }
}

async fn handle_message(state: &Arc<AppState>, message: &Message) -> Result<(), AppError> {
    let Some(from) = &message.from else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let user = state
        .users
        .ensure(
            from.id,
            &from.display_name(),
            state.config.is_admin_chat(from.id),
        )
        .await?;

    if let Some(document) = &message.document {
        let outcome = state.flow.attach_file(user.id, document).await?;
        return send_flow_outcome(state, chat_id, outcome).await;
    }

    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };

    let trimmed = text.trim();
    if trimmed == "/start" || trimmed.starts_with("/start ") {
        state.users.mark_started(user.id).await?;
        let payload = trimmed["/start".len()..].trim();
        if !payload.is_empty() {
            // Deep-link payloads reuse the action encoding ("open_<id>").
            return match Action::decode(payload) {
                Ok(Action::Open(record_id)) => {
                    let outcome = state.lifecycle.open(user.id, record_id).await?;
                    send_lifecycle_outcome(state, chat_id, outcome).await
                }
                _ => send_text(state, chat_id, UNRECOGNIZED_ACTION).await,
            };
        }
        return send_welcome(state, chat_id, &user).await;
    }

    match trimmed {
        "/upload" => {
            if !user.is_admin {
                return send_text(state, chat_id, NOT_AN_ADMIN).await;
            }
            let outcome = state.flow.begin(user.id).await?;
            send_flow_outcome(state, chat_id, outcome).await
        }
        "/cancel" => {
            let outcome = state.flow.cancel(user.id).await?;
            send_flow_outcome(state, chat_id, outcome).await
        }
        "/notes" => send_owner_records(state, chat_id, &user).await,
        "/stats" => {
            if !user.is_admin {
                return send_text(state, chat_id, NOT_AN_ADMIN).await;
            }
            let stats = state.lifecycle.stats().await?;
            send_text(
                state,
                chat_id,
                &format!(
                    "Notes: {} ({} visible). Users: {}. Total views: {}.",
                    stats.records, stats.active_records, stats.users, stats.total_views
                ),
            )
            .await
        }
        other if other.starts_with('/') => {
            send_text(state, chat_id, "Unknown command.").await
        }
        _ => {
            // Bare text feeds the title/description steps.
            let outcome = state.flow.submit_text(user.id, text).await?;
            send_flow_outcome(state, chat_id, outcome).await
        }
    }
}

async fn handle_callback(state: &Arc<AppState>, callback: &CallbackQuery) -> Result<(), AppError> {
    // Acknowledge first so the client stops its spinner even if the action
    // itself turns out to be stale.
    if let Err(err) = state.chat.answer_callback(&callback.id).await {
        tracing::debug!(callback_id = %callback.id, error = %err, "Failed to acknowledge callback");
    }

    let from = &callback.from;
    let chat_id = callback.chat_id();
    let user = state
        .users
        .ensure(
            from.id,
            &from.display_name(),
            state.config.is_admin_chat(from.id),
        )
        .await?;

    let Some(data) = callback.data.as_deref() else {
        return send_text(state, chat_id, UNRECOGNIZED_ACTION).await;
    };

    let action = match Action::decode(data) {
        Ok(action) => action,
        Err(err) => {
            tracing::debug!(data = %data, error = %err, "Unrecognized action string");
            return send_text(state, chat_id, UNRECOGNIZED_ACTION).await;
        }
    };

    match action {
        Action::Upload => {
            if !user.is_admin {
                return send_text(state, chat_id, NOT_AN_ADMIN).await;
            }
            let outcome = state.flow.begin(user.id).await?;
            send_flow_outcome(state, chat_id, outcome).await
        }
        Action::Cancel => {
            let outcome = state.flow.cancel(user.id).await?;
            send_flow_outcome(state, chat_id, outcome).await
        }
        Action::Folder(folder_id) => {
            let outcome = state.flow.choose_folder(user.id, &folder_id).await?;
            send_flow_outcome(state, chat_id, outcome).await
        }
        Action::Category(category_id) => {
            let outcome = state.flow.choose_category(user.id, &category_id).await?;
            send_flow_outcome(state, chat_id, outcome).await
        }
        Action::Open(record_id) => {
            let outcome = state.lifecycle.open(user.id, record_id).await?;
            send_lifecycle_outcome(state, chat_id, outcome).await
        }
        Action::Share(record_id) => {
            let outcome = state.lifecycle.share_link(record_id).await?;
            send_lifecycle_outcome(state, chat_id, outcome).await
        }
        Action::Revoke(record_id) => {
            let outcome = state.lifecycle.revoke(&user, record_id).await?;
            send_lifecycle_outcome(state, chat_id, outcome).await
        }
        Action::Restore(record_id) => {
            let outcome = state.lifecycle.restore(&user, record_id).await?;
            send_lifecycle_outcome(state, chat_id, outcome).await
        }
        Action::Regenerate(record_id) => {
            let outcome = state.lifecycle.regenerate_link(&user, record_id).await?;
            send_lifecycle_outcome(state, chat_id, outcome).await
        }
        Action::Delete(record_id) => {
            let outcome = state.lifecycle.delete(&user, record_id).await?;
            send_lifecycle_outcome(state, chat_id, outcome).await
        }
    }
}

async fn send_welcome(state: &Arc<AppState>, chat_id: i64, user: &User) -> Result<(), AppError> {
    if user.is_admin {
        let keyboard =
            InlineKeyboard::new().row(vec![InlineButton::new("New note", Action::Upload.to_string())]);
        send_keyboard(
            state,
            chat_id,
            "Welcome to the notes library. Use /upload to add a note and /notes to manage yours.",
            &keyboard,
        )
        .await
    } else {
        send_text(
            state,
            chat_id,
            "Welcome to the notes library. Open a shared link to read a note.",
        )
        .await
    }
}

async fn send_owner_records(
    state: &Arc<AppState>,
    chat_id: i64,
    user: &User,
) -> Result<(), AppError> {
    let records = state.lifecycle.records_for_owner(user.id).await?;
    if records.is_empty() {
        return send_text(state, chat_id, "You have no notes yet.").await;
    }
    for record in records {
        let marker = if record.active { "" } else { " [hidden]" };
        let text = format!(
            "{}{}\n{}\nViews: {}",
            record.title, marker, record.description, record.views
        );
        let keyboard = record_keyboard(&record);
        send_keyboard(state, chat_id, &text, &keyboard).await?;
    }
    Ok(())
}

fn record_keyboard(record: &Record) -> InlineKeyboard {
    let id = record.id;
    let visibility = if record.active {
        InlineButton::new("Hide", Action::Revoke(id).to_string())
    } else {
        InlineButton::new("Unhide", Action::Restore(id).to_string())
    };
    InlineKeyboard::new()
        .row(vec![
            InlineButton::new("Open", Action::Open(id).to_string()),
            InlineButton::new("Share", Action::Share(id).to_string()),
        ])
        .row(vec![
            visibility,
            InlineButton::new("New link", Action::Regenerate(id).to_string()),
            InlineButton::new("Delete", Action::Delete(id).to_string()),
        ])
}

async fn send_flow_outcome(
    state: &Arc<AppState>,
    chat_id: i64,
    outcome: FlowOutcome,
) -> Result<(), AppError> {
    match outcome {
        FlowOutcome::Started { folders } => {
            let mut keyboard = InlineKeyboard::column(
                folders
                    .iter()
                    .map(|f| (f.name.to_string(), Action::Folder(f.id.to_string()).to_string())),
            );
            keyboard = keyboard.row(vec![InlineButton::new("Cancel", Action::Cancel.to_string())]);
            send_keyboard(state, chat_id, "Choose a folder for the new note:", &keyboard).await
        }
        FlowOutcome::FolderChosen { folder, categories } => {
            let mut keyboard = InlineKeyboard::column(categories.iter().map(|c| {
                (
                    c.name.to_string(),
                    Action::Category(c.id.to_string()).to_string(),
                )
            }));
            keyboard = keyboard.row(vec![InlineButton::new("Cancel", Action::Cancel.to_string())]);
            send_keyboard(
                state,
                chat_id,
                &format!("Folder: {}. Now choose a category:", folder.name),
                &keyboard,
            )
            .await
        }
        FlowOutcome::CategoryChosen { category } => {
            send_text(
                state,
                chat_id,
                &format!("Category: {}. Send the note title.", category.name),
            )
            .await
        }
        FlowOutcome::TitleSaved => {
            send_text(state, chat_id, "Title saved. Now send a short description.").await
        }
        FlowOutcome::DescriptionSaved => {
            send_text(
                state,
                chat_id,
                "Description saved. Now attach the note as an .html document.",
            )
            .await
        }
        FlowOutcome::Completed { record } => {
            let keyboard = record_keyboard(&record);
            send_keyboard(
                state,
                chat_id,
                &format!("\"{}\" is published.", record.title),
                &keyboard,
            )
            .await
        }
        FlowOutcome::Cancelled => send_text(state, chat_id, "Upload cancelled.").await,
        FlowOutcome::NothingToCancel => {
            send_text(state, chat_id, "No upload in progress.").await
        }
        FlowOutcome::Rejected(rejection) => {
            send_text(state, chat_id, &rejection_text(&rejection)).await
        }
        FlowOutcome::SessionExpired => send_text(state, chat_id, SESSION_EXPIRED).await,
    }
}

fn rejection_text(rejection: &FlowRejection) -> String {
    match rejection {
        FlowRejection::UnknownFolder => {
            "That folder does not exist. Pick one from the menu.".to_string()
        }
        FlowRejection::CategoryNotInFolder => {
            "That category does not belong to the chosen folder. Pick one from the menu."
                .to_string()
        }
        FlowRejection::EmptyTitle => "The title cannot be empty. Send the note title.".to_string(),
        FlowRejection::EmptyDescription => {
            "The description cannot be empty. Send a short description.".to_string()
        }
        FlowRejection::WrongExtension { file_name } => {
            let got = file_name
                .as_deref()
                .map(|name| format!(" (got \"{}\")", name))
                .unwrap_or_default();
            format!("Only .html documents are accepted{}. Send the .html file.", got)
        }
    }
}

async fn send_lifecycle_outcome(
    state: &Arc<AppState>,
    chat_id: i64,
    outcome: LifecycleOutcome,
) -> Result<(), AppError> {
    let text = match outcome {
        LifecycleOutcome::Revoked => "The note is now hidden from readers.".to_string(),
        LifecycleOutcome::Restored => "The note is visible again.".to_string(),
        LifecycleOutcome::Regenerated { url } => format!("New access link:\n{}", url),
        LifecycleOutcome::Deleted => "The note and its file have been removed.".to_string(),
        LifecycleOutcome::Opened { title, url } => format!("{}\n{}", title, url),
        LifecycleOutcome::Shared { title, link } => format!("Share \"{}\":\n{}", title, link),
        LifecycleOutcome::Unavailable => "This note is not available.".to_string(),
        LifecycleOutcome::NotFound => "This note no longer exists.".to_string(),
        LifecycleOutcome::NotOwner => "Only the note's owner can do that.".to_string(),
    };
    send_text(state, chat_id, &text).await
}

async fn send_text(state: &Arc<AppState>, chat_id: i64, text: &str) -> Result<(), AppError> {
    state
        .chat
        .send_message(chat_id, text)
        .await
        .map_err(|e| AppError::Chat(e.to_string()))
}

async fn send_keyboard(
    state: &Arc<AppState>,
    chat_id: i64,
    text: &str,
    keyboard: &InlineKeyboard,
) -> Result<(), AppError> {
    state
        .chat
        .send_message_with_keyboard(chat_id, text, keyboard)
        .await
        .map_err(|e| AppError::Chat(e.to_string()))
}
