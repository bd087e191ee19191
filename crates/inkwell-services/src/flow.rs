//! Upload session state machine.
//!
//! The dialogue runs `awaiting_folder → awaiting_category → awaiting_title →
//! awaiting_description → awaiting_file`, then the record is created and the
//! session deleted. The process is stateless between events: every step loads
//! the session, checks the event against the loaded state, and persists the
//! result. An event whose expected state does not match the loaded one — a
//! stale button press from a cancelled, completed, or superseded dialogue, or
//! no session at all — is answered as session-expired and never mutates
//! anything.

use std::sync::Arc;
use std::time::Duration;

use inkwell_chat::DocumentAttachment;
use inkwell_core::models::{Record, SessionPatch, SessionState, UploadSession};
use inkwell_core::taxonomy::{self, Category, Folder};
use inkwell_core::AppError;
use inkwell_db::{RecordStore, SessionStore};

use crate::transfer::ContentTransfer;

/// The single accepted attachment extension.
const ACCEPTED_EXTENSION: &str = ".html";

/// What a step produced; the webhook layer renders these into replies.
#[derive(Debug)]
pub enum FlowOutcome {
    /// Dialogue (re)started; present the folder menu.
    Started { folders: &'static [Folder] },
    /// Folder accepted; present this folder's categories.
    FolderChosen {
        folder: &'static Folder,
        categories: Vec<&'static Category>,
    },
    /// Category accepted; ask for a title.
    CategoryChosen { category: &'static Category },
    /// Title recorded; ask for a description.
    TitleSaved,
    /// Description recorded; ask for the file.
    DescriptionSaved,
    /// Record created and session closed.
    Completed { record: Record },
    /// Session deleted on user request.
    Cancelled,
    /// Cancel arrived with no dialogue in progress.
    NothingToCancel,
    /// Input rejected; the session state is unchanged.
    Rejected(FlowRejection),
    /// The event did not match the loaded session state (or there was no
    /// live session); the user must restart.
    SessionExpired,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FlowRejection {
    UnknownFolder,
    CategoryNotInFolder,
    EmptyTitle,
    EmptyDescription,
    WrongExtension { file_name: Option<String> },
}

#[derive(Clone)]
pub struct UploadFlow {
    sessions: Arc<dyn SessionStore>,
    records: Arc<dyn RecordStore>,
    transfer: ContentTransfer,
    session_ttl: Duration,
}

impl UploadFlow {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        records: Arc<dyn RecordStore>,
        transfer: ContentTransfer,
        session_ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            records,
            transfer,
            session_ttl,
        }
    }

    /// Start a fresh dialogue, superseding any session already in progress.
    /// A save failure here is fatal to the step: without the persisted
    /// session every following event would look like "no session".
    pub async fn begin(&self, user_id: i64) -> Result<FlowOutcome, AppError> {
        self.sessions.delete(user_id).await?;
        self.sessions
            .save(user_id, SessionPatch::state(SessionState::AwaitingFolder))
            .await?;

        tracing::info!(user_id, "Upload dialogue started");
        Ok(FlowOutcome::Started {
            folders: taxonomy::FOLDERS,
        })
    }

    /// Delete any session unconditionally.
    pub async fn cancel(&self, user_id: i64) -> Result<FlowOutcome, AppError> {
        let had_session = self.sessions.load(user_id).await?.is_some();
        self.sessions.delete(user_id).await?;
        if had_session {
            tracing::info!(user_id, "Upload dialogue cancelled");
            Ok(FlowOutcome::Cancelled)
        } else {
            Ok(FlowOutcome::NothingToCancel)
        }
    }

    /// Load the user's session, applying the TTL policy: a session idle past
    /// the TTL is deleted here and treated as absent.
    async fn load_live(&self, user_id: i64) -> Result<Option<UploadSession>, AppError> {
        match self.sessions.load(user_id).await? {
            Some(session) if session.is_expired(self.session_ttl) => {
                tracing::info!(user_id, state = %session.state, "Session expired by TTL");
                self.sessions.delete(user_id).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Load the session and require it to be at `expected`.
    async fn load_at(
        &self,
        user_id: i64,
        expected: SessionState,
    ) -> Result<Option<UploadSession>, AppError> {
        match self.load_live(user_id).await? {
            Some(session) if session.state == expected => Ok(Some(session)),
            Some(session) => {
                tracing::debug!(
                    user_id,
                    loaded = %session.state,
                    expected = %expected,
                    "Event does not match session state"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub async fn choose_folder(
        &self,
        user_id: i64,
        folder_id: &str,
    ) -> Result<FlowOutcome, AppError> {
        if self
            .load_at(user_id, SessionState::AwaitingFolder)
            .await?
            .is_none()
        {
            return Ok(FlowOutcome::SessionExpired);
        }

        let Some(folder) = taxonomy::folder_by_id(folder_id) else {
            return Ok(FlowOutcome::Rejected(FlowRejection::UnknownFolder));
        };

        let mut patch = SessionPatch::state(SessionState::AwaitingCategory);
        patch.folder_id = Some(folder.id.to_string());
        self.sessions.save(user_id, patch).await?;

        Ok(FlowOutcome::FolderChosen {
            folder,
            categories: taxonomy::categories_in(folder.id),
        })
    }

    pub async fn choose_category(
        &self,
        user_id: i64,
        category_id: &str,
    ) -> Result<FlowOutcome, AppError> {
        let Some(session) = self
            .load_at(user_id, SessionState::AwaitingCategory)
            .await?
        else {
            return Ok(FlowOutcome::SessionExpired);
        };

        let Some(folder_id) = session.draft.folder_id.as_deref() else {
            // Draft lost its folder; the session is unusable.
            self.sessions.delete(user_id).await?;
            return Ok(FlowOutcome::SessionExpired);
        };

        let Some(category) = taxonomy::category_by_id(category_id) else {
            return Ok(FlowOutcome::Rejected(FlowRejection::CategoryNotInFolder));
        };
        if category.folder_id != folder_id {
            return Ok(FlowOutcome::Rejected(FlowRejection::CategoryNotInFolder));
        }

        let mut patch = SessionPatch::state(SessionState::AwaitingTitle);
        patch.category_id = Some(category.id.to_string());
        self.sessions.save(user_id, patch).await?;

        Ok(FlowOutcome::CategoryChosen { category })
    }

    /// Free-text input: a title or a description depending on the loaded
    /// state. Text arriving in any other state is a stale event.
    pub async fn submit_text(&self, user_id: i64, text: &str) -> Result<FlowOutcome, AppError> {
        let Some(session) = self.load_live(user_id).await? else {
            return Ok(FlowOutcome::SessionExpired);
        };

        match session.state {
            SessionState::AwaitingTitle => {
                if text.trim().is_empty() {
                    return Ok(FlowOutcome::Rejected(FlowRejection::EmptyTitle));
                }
                let mut patch = SessionPatch::state(SessionState::AwaitingDescription);
                patch.title = Some(text.to_string());
                self.sessions.save(user_id, patch).await?;
                Ok(FlowOutcome::TitleSaved)
            }
            SessionState::AwaitingDescription => {
                if text.trim().is_empty() {
                    return Ok(FlowOutcome::Rejected(FlowRejection::EmptyDescription));
                }
                let mut patch = SessionPatch::state(SessionState::AwaitingFile);
                patch.description = Some(text.to_string());
                self.sessions.save(user_id, patch).await?;
                Ok(FlowOutcome::DescriptionSaved)
            }
            _ => Ok(FlowOutcome::SessionExpired),
        }
    }

    /// Terminal step: validate the attachment, run content transfer, persist
    /// the record, delete the session.
    ///
    /// On transfer or record-store failure the session is deleted anyway so
    /// the user is never stuck in `awaiting_file`; they restart with a fresh
    /// dialogue.
    pub async fn attach_file(
        &self,
        user_id: i64,
        attachment: &DocumentAttachment,
    ) -> Result<FlowOutcome, AppError> {
        let Some(session) = self.load_at(user_id, SessionState::AwaitingFile).await? else {
            return Ok(FlowOutcome::SessionExpired);
        };

        let accepted = attachment
            .file_name
            .as_deref()
            .map(|name| name.to_lowercase().ends_with(ACCEPTED_EXTENSION))
            .unwrap_or(false);
        if !accepted {
            return Ok(FlowOutcome::Rejected(FlowRejection::WrongExtension {
                file_name: attachment.file_name.clone(),
            }));
        }

        let draft = session.draft;
        let (Some(folder_id), Some(category_id), Some(title), Some(description)) = (
            draft.folder_id,
            draft.category_id,
            draft.title,
            draft.description,
        ) else {
            // Incomplete draft in awaiting_file should be impossible; treat
            // the session as unusable rather than creating a broken record.
            self.sessions.delete(user_id).await?;
            return Ok(FlowOutcome::SessionExpired);
        };

        let stored = match self.transfer.transfer(attachment).await {
            Ok(stored) => stored,
            Err(err) => {
                // Forward progress over retry-ability: close the session so
                // the next attempt starts clean.
                if let Err(delete_err) = self.sessions.delete(user_id).await {
                    tracing::warn!(
                        user_id,
                        error = %delete_err,
                        "Failed to delete session after transfer failure"
                    );
                }
                tracing::warn!(user_id, error = %err, "Content transfer failed");
                return Err(err.into());
            }
        };

        let record = Record::new(
            user_id,
            title,
            description,
            folder_id,
            category_id,
            stored.key,
            stored.url,
        );

        if let Err(err) = self.records.create(&record).await {
            if let Err(delete_err) = self.sessions.delete(user_id).await {
                tracing::warn!(
                    user_id,
                    error = %delete_err,
                    "Failed to delete session after record-store failure"
                );
            }
            return Err(err);
        }

        // The record is authoritative from here on; a failed session delete
        // is only logged and the stale row falls to the state check or TTL.
        if let Err(err) = self.sessions.delete(user_id).await {
            tracing::warn!(user_id, error = %err, "Failed to delete completed session");
        }

        tracing::info!(user_id, record_id = %record.id, "Upload completed");
        Ok(FlowOutcome::Completed { record })
    }
}
