//! Teamup-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TeamupError {
    #[error("Invalid identity: {0} must not be empty")]
    InvalidIdentity(&'static str),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response code {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("No subcalendar found with room ID {0:?}")]
    RoomNotFound(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("unable to get subcalendar id: {0}")]
    SubcalendarLookup(#[source] Box<TeamupError>),
}

impl TeamupError {
    /// The innermost error, with context wrappers removed.
    pub fn root_cause(&self) -> &TeamupError {
        match self {
            Self::SubcalendarLookup(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// HTTP status of a non-2xx response anywhere in the chain.
    pub fn status(&self) -> Option<u16> {
        match self.root_cause() {
            Self::RemoteService { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::RoomNotFound(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root_cause(), Self::Cancelled)
    }

    pub(crate) fn lookup(inner: TeamupError) -> Self {
        Self::SubcalendarLookup(Box::new(inner))
    }
}
