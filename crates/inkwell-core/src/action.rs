//! Action-string codec for interactive controls.
//!
//! Buttons carry a compact `"<verb>_<id>"` string; this module decodes it into
//! a closed `Action` enum in a single step so dispatch is an exhaustive match
//! instead of scattered string-prefix checks. Verbs and ids never contain the
//! `_` separator (record ids are hyphenated UUIDs).

use std::fmt::{Display, Formatter, Result as FmtResult};

use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("unknown action verb: {0}")]
    UnknownVerb(String),

    #[error("action {0} is missing its identifier")]
    MissingId(String),

    #[error("action {verb} carries an invalid record id: {id}")]
    InvalidRecordId { verb: String, id: String },
}

/// Everything an interactive control can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start (or restart) the guided upload dialogue.
    Upload,
    /// Abandon the in-progress upload dialogue.
    Cancel,
    /// Folder chosen during the upload dialogue.
    Folder(String),
    /// Category chosen during the upload dialogue.
    Category(String),
    /// View a record's content (counts a view).
    Open(Uuid),
    /// Produce a shareable access link for a record.
    Share(Uuid),
    /// Hide a record from consumers.
    Revoke(Uuid),
    /// Make a revoked record visible again.
    Restore(Uuid),
    /// Allocate a fresh access link for a record.
    Regenerate(Uuid),
    /// Remove a record and its backing object.
    Delete(Uuid),
}

impl Action {
    /// Decode an action string received from an interactive control.
    pub fn decode(raw: &str) -> Result<Action, ActionParseError> {
        match raw {
            "upload" => return Ok(Action::Upload),
            "cancel" => return Ok(Action::Cancel),
            _ => {}
        }

        let (verb, id) = raw
            .split_once('_')
            .ok_or_else(|| ActionParseError::UnknownVerb(raw.to_string()))?;
        if id.is_empty() {
            return Err(ActionParseError::MissingId(verb.to_string()));
        }

        let record_id = |verb: &str, id: &str| {
            Uuid::parse_str(id).map_err(|_| ActionParseError::InvalidRecordId {
                verb: verb.to_string(),
                id: id.to_string(),
            })
        };

        match verb {
            "folder" => Ok(Action::Folder(id.to_string())),
            "category" => Ok(Action::Category(id.to_string())),
            "open" => Ok(Action::Open(record_id(verb, id)?)),
            "share" => Ok(Action::Share(record_id(verb, id)?)),
            "revoke" => Ok(Action::Revoke(record_id(verb, id)?)),
            "restore" => Ok(Action::Restore(record_id(verb, id)?)),
            "regen" => Ok(Action::Regenerate(record_id(verb, id)?)),
            "delete" => Ok(Action::Delete(record_id(verb, id)?)),
            other => Err(ActionParseError::UnknownVerb(other.to_string())),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Action::Upload => write!(f, "upload"),
            Action::Cancel => write!(f, "cancel"),
            Action::Folder(id) => write!(f, "folder_{}", id),
            Action::Category(id) => write!(f, "category_{}", id),
            Action::Open(id) => write!(f, "open_{}", id),
            Action::Share(id) => write!(f, "share_{}", id),
            Action::Revoke(id) => write!(f, "revoke_{}", id),
            Action::Restore(id) => write!(f, "restore_{}", id),
            Action::Regenerate(id) => write!(f, "regen_{}", id),
            Action::Delete(id) => write!(f, "delete_{}", id),
        }
    }
}
