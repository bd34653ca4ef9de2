//! Error taxonomy for client operations.

use std::fmt;

// =============================================================================
// OPERATION
// =============================================================================

/// The public operation an error or diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListRooms,
    Login,
    Logout,
    SendMessage,
    Ping,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListRooms => "list_rooms",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::SendMessage => "send_message",
            Self::Ping => "ping",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by [`crate::PokecClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum PokecError {
    /// The transport failed to complete the HTTP exchange.
    #[error("{operation} request failed: {message}")]
    Request { operation: Operation, message: String },

    /// The response body could not be decoded as expected.
    #[error("{operation} response parse failed: {message}")]
    Parse { operation: Operation, message: String },

    /// A required argument was missing or empty.
    #[error("missing required argument: {0}")]
    Validation(String),

    /// No token is held, or the server rejected the credentials.
    #[error("{0}")]
    Authentication(String),

    /// The server rejected the submitted message.
    #[error("send message failed{}", reason_suffix(.reason.as_deref()))]
    Send { reason: Option<String> },
}

fn reason_suffix(reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!(": {reason}"),
        _ => String::new(),
    }
}

impl PokecError {
    pub(crate) fn login_required() -> Self {
        Self::Authentication("login required".into())
    }

    pub(crate) fn login_failed() -> Self {
        Self::Authentication("login failed".into())
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Request { .. } => "E_REQUEST",
            Self::Parse { .. } => "E_PARSE",
            Self::Validation(_) => "E_VALIDATION",
            Self::Authentication(_) => "E_AUTHENTICATION",
            Self::Send { .. } => "E_SEND",
        }
    }

    /// Failures are surfaced once; nothing at this layer is retried.
    #[must_use]
    pub fn retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
