//! Transient notifications (toasts)

use serde::Serialize;

use crate::error::{ClientError, ClientResult};

pub const UPLOAD_FAILED: &str = "Failed to upload or process file.";

/// Fallback text when a page of messages fails to load
pub const FETCH_FAILED: &str = "Failed to fetch messages";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Info,
}

/// A message shown briefly to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    /// Error toast with the backend's message, or `fallback`
    pub fn from_error(err: &ClientError, fallback: &str) -> Self {
        Self::error(err.user_message(fallback))
    }

    /// Toast for a finished context upload
    pub fn upload_outcome(result: &ClientResult<u64>) -> Self {
        match result {
            Ok(chunks) => Self::success(format!("{} chunks stored.", chunks)),
            Err(ClientError::Validation(message)) => Self::error(message.clone()),
            Err(_) => Self::error(UPLOAD_FAILED),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = match self.level {
            Level::Success => "✓",
            Level::Error => "✕",
            Level::Info => "ℹ",
        };
        write!(f, "{} {}", mark, self.message)
    }
}

/// Newest toast per level, so an expiring timer only clears its own toast
#[derive(Clone, Copy, Debug, Default)]
pub struct ToastSlots {
    next_id: u64,
    shown: [u64; 3],
}

impl ToastSlots {
    fn slot(level: Level) -> usize {
        match level {
            Level::Success => 0,
            Level::Error => 1,
            Level::Info => 2,
        }
    }

    /// Record a toast replacing whatever `level` showed; returns its id
    pub fn show(&mut self, level: Level) -> u64 {
        self.next_id += 1;
        self.shown[Self::slot(level)] = self.next_id;
        self.next_id
    }

    /// Whether toast `id` is still the one shown for `level`
    pub fn is_shown(&self, level: Level, id: u64) -> bool {
        self.shown[Self::slot(level)] == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_success_mentions_chunks() {
        let n = Notification::upload_outcome(&Ok(5));
        assert_eq!(n.level, Level::Success);
        assert!(n.message.contains('5'));
        assert_eq!(n.message, "5 chunks stored.");
    }

    #[test]
    fn test_upload_failure_is_generic() {
        let n = Notification::upload_outcome(&Err(ClientError::Transport("reset".into())));
        assert!(n.is_error());
        assert_eq!(n.message, UPLOAD_FAILED);

        let n = Notification::upload_outcome(&Err(ClientError::from_status(500, Some("boom".into()))));
        assert_eq!(n.message, UPLOAD_FAILED);
    }

    #[test]
    fn test_from_error_uses_backend_message() {
        let err = ClientError::from_status(409, Some("Company already exists".into()));
        let n = Notification::from_error(&err, "Failed to add company.");
        assert_eq!(n.to_string(), "✕ Company already exists");
    }

    #[test]
    fn test_older_toast_timer_leaves_newer_toast() {
        let mut slots = ToastSlots::default();
        let first = slots.show(Level::Success);
        let second = slots.show(Level::Success);
        let error = slots.show(Level::Error);

        assert!(!slots.is_shown(Level::Success, first));
        assert!(slots.is_shown(Level::Success, second));
        assert!(slots.is_shown(Level::Error, error));
    }
}
