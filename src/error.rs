//! Client Error Types
//!
//! One error type for every failure a view can hit, plus a coarse
//! classification used to decide how the failure is surfaced.

use thiserror::Error;

/// Errors raised by the API client, the session store and form validation
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    /// Missing or rejected bearer token
    #[error("Not authorized ({status})")]
    Unauthorized { status: u16, message: Option<String> },

    /// The response body did not match the expected shape
    #[error("Parse error: {0}")]
    Decode(String),

    /// Input rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    /// Local persistence failed (session file, browser storage)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a failure should be handled by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure
    Network,
    /// Backend-reported validation or business error
    Backend,
    /// Missing or invalid token; the view must go back to login
    Authorization,
    /// Rejected or failed locally before or after the call
    Local,
}

impl ClientError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Network,
            ClientError::Api { .. } | ClientError::Decode(_) => ErrorKind::Backend,
            ClientError::Unauthorized { .. } => ErrorKind::Authorization,
            ClientError::Validation(_) | ClientError::Storage(_) | ClientError::Io(_) => {
                ErrorKind::Local
            }
        }
    }

    /// Build an error from a non-success status and the backend's message
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 | 403 => ClientError::Unauthorized { status, message },
            _ => ClientError::Api { status, message },
        }
    }

    /// Reclassify a rejected sign-in.
    ///
    /// A 401 from a login endpoint means bad credentials, not an expired
    /// session, so it must not send the caller back through logout.
    pub fn into_login_failure(self) -> Self {
        match self {
            ClientError::Unauthorized { status, message } => ClientError::Api { status, message },
            other => other,
        }
    }

    /// Text for a user-facing notification.
    ///
    /// Backend messages and local validation messages are shown verbatim;
    /// everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                message: Some(message),
                ..
            }
            | ClientError::Unauthorized {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Validation(message) => message.clone(),
            ClientError::Unauthorized { .. } => "Session expired. Please log in again.".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the caller should drop its session and return to login
    pub fn requires_login(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::from_status(status.as_u16(), None)
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ClientError::from_status(401, None).kind(), ErrorKind::Authorization);
        assert_eq!(ClientError::from_status(403, None).kind(), ErrorKind::Authorization);
        assert_eq!(
            ClientError::from_status(422, Some("bad".into())).kind(),
            ErrorKind::Backend
        );
        assert_eq!(ClientError::Transport("refused".into()).kind(), ErrorKind::Network);
        assert_eq!(ClientError::Validation("empty".into()).kind(), ErrorKind::Local);
    }

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ClientError::from_status(400, Some("Email already exists".into()));
        assert_eq!(err.user_message("Failed to add company."), "Email already exists");

        let err = ClientError::from_status(500, None);
        assert_eq!(err.user_message("Failed to add company."), "Failed to add company.");

        let err = ClientError::Transport("connection refused".into());
        assert_eq!(err.user_message("Login failed. Please try again."), "Login failed. Please try again.");
    }

    #[test]
    fn test_blank_backend_message_falls_back() {
        let err = ClientError::from_status(400, Some("   ".into()));
        assert_eq!(err.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_unauthorized_requires_login() {
        assert!(ClientError::from_status(401, None).requires_login());
        assert!(!ClientError::from_status(404, None).requires_login());
    }

    #[test]
    fn test_unauthorized_keeps_backend_text() {
        let err = ClientError::from_status(403, Some("Token revoked".into()));
        assert_eq!(err.user_message("fallback"), "Token revoked");

        let err = ClientError::from_status(401, None);
        assert_eq!(err.user_message("fallback"), "Session expired. Please log in again.");
    }

    #[test]
    fn test_rejected_login_is_not_expired_session() {
        let err = ClientError::from_status(401, Some("Invalid credentials".into())).into_login_failure();
        assert!(!err.requires_login());
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(err.user_message("Login failed. Please try again."), "Invalid credentials");

        let err = ClientError::Transport("refused".into()).into_login_failure();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
