use thiserror::Error as ThisError;

/// Error code the issuance service uses for unexpected failures.
pub const INTERNAL_ERROR: &str = "InternalError";

/// Error reported by the remote issuance service, identified by its code.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("[{code}] {message} (request id: '{request_id}')")]
pub struct RemoteError {
    pub code: String,
    pub message: String,
    pub request_id: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    /// A request field is missing or malformed. Never retried.
    #[error("invalid {field}: [{code}] {message}")]
    Validation {
        code: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("remote error {0}")]
    Remote(#[from] RemoteError),

    /// The issuance service could not be reached or answered with something unreadable.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal error: {message} (request id: '{request_id}')")]
    Internal { message: String, request_id: String },
}

impl Error {
    pub(crate) fn validation(code: &'static str, field: &'static str, message: &str) -> Self {
        Error::Validation {
            code,
            field,
            message: message.to_owned(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    /// Remote error code, if the failure came from the issuance service.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Remote(remote) => Some(remote.code.as_str()),
            Error::Validation { code, .. } => Some(*code),
            Error::Transport(_) => None,
            Error::Internal { .. } => Some(INTERNAL_ERROR),
        }
    }

    /// See [`crate::errorcode::is_user_actionable`].
    pub fn is_user_actionable(&self) -> bool {
        crate::errorcode::is_user_actionable(Some(self))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
