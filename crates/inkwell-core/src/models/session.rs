//! Upload-session model: the ephemeral per-user state of the guided dialogue.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dialogue position: each state names exactly the next piece of information
/// expected from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingFolder,
    AwaitingCategory,
    AwaitingTitle,
    AwaitingDescription,
    AwaitingFile,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::AwaitingFolder => "awaiting_folder",
            SessionState::AwaitingCategory => "awaiting_category",
            SessionState::AwaitingTitle => "awaiting_title",
            SessionState::AwaitingDescription => "awaiting_description",
            SessionState::AwaitingFile => "awaiting_file",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::AwaitingFolder
    }
}

impl FromStr for SessionState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_folder" => Ok(SessionState::AwaitingFolder),
            "awaiting_category" => Ok(SessionState::AwaitingCategory),
            "awaiting_title" => Ok(SessionState::AwaitingTitle),
            "awaiting_description" => Ok(SessionState::AwaitingDescription),
            "awaiting_file" => Ok(SessionState::AwaitingFile),
            other => Err(anyhow::anyhow!("Invalid session state: {}", other)),
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Record fields accumulated so far by the dialogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub folder_id: Option<String>,
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// One in-progress upload dialogue, keyed by user id. At most one exists per
/// user; `updated_at` drives the TTL-on-access expiry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    pub user_id: i64,
    pub state: SessionState,
    pub draft: Draft,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UploadSession {
    /// Whether this session has been idle longer than `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Utc::now() - self.updated_at > ttl
    }
}

/// Merge-write patch for a session: `None` draft fields leave the stored
/// value untouched, so concurrent step writes never clobber earlier answers.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub state: SessionState,
    pub folder_id: Option<String>,
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SessionPatch {
    pub fn state(state: SessionState) -> Self {
        SessionPatch {
            state,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            SessionState::AwaitingFolder,
            SessionState::AwaitingCategory,
            SessionState::AwaitingTitle,
            SessionState::AwaitingDescription,
            SessionState::AwaitingFile,
        ] {
            assert_eq!(state.as_str().parse::<SessionState>().unwrap(), state);
        }
        assert!("finished".parse::<SessionState>().is_err());
    }

    #[test]
    fn test_expiry() {
        let mut session = UploadSession {
            user_id: 1,
            state: SessionState::AwaitingTitle,
            draft: Draft::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!session.is_expired(Duration::from_secs(60)));
        session.updated_at = Utc::now() - chrono::Duration::minutes(31);
        assert!(session.is_expired(Duration::from_secs(30 * 60)));
    }
}
