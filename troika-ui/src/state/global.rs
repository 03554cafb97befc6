//! Global Application State
//!
//! Reactive state management using Leptos signals.

use leptos::*;
use troika::{
    ClientError, ClientResult, Level, Notification, Role, Session, SessionStore, ToastSlots,
};

use super::storage::LocalStorage;

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Session read from `localStorage`; refreshed on login and logout
    pub session: RwSignal<Option<Session>>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
    /// Informational message (for toasts)
    pub info: RwSignal<Option<String>>,
    toasts: StoredValue<ToastSlots>,
}

/// Session store over the window's `localStorage`
pub fn session_store() -> SessionStore<LocalStorage> {
    SessionStore::new(LocalStorage)
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        session: create_rw_signal(session_store().session()),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
        info: create_rw_signal(None),
        toasts: store_value(ToastSlots::default()),
    };

    provide_context(state);
}

/// The global state; panics outside the `App` tree
pub fn use_global_state() -> GlobalState {
    expect_context::<GlobalState>()
}

impl GlobalState {
    /// Persist a freshly issued token and publish the new session
    pub fn sign_in(&self, token: &str, role: Role) -> ClientResult<()> {
        if token.trim().is_empty() {
            return Err(ClientError::Decode("login response carried no token".into()));
        }
        let store = session_store();
        store.set_session(token, role)?;
        self.session.set(store.session());
        Ok(())
    }

    /// Remove every session key
    pub fn sign_out(&self) {
        if let Err(e) = session_store().clear_session() {
            web_sys::console::error_1(&format!("Failed to clear session: {}", e).into());
        }
        self.session.set(None);
    }

    /// Show a notification (auto-clears after timeout)
    pub fn notify(&self, notification: Notification) {
        let (signal, ms) = match notification.level {
            Level::Success => (self.success, 3000),
            Level::Info => (self.info, 3000),
            Level::Error => (self.error, 5000),
        };
        let level = notification.level;
        let id = self.toasts.try_update_value(|t| t.show(level)).unwrap_or_default();
        signal.set(Some(notification.message));

        let toasts = self.toasts;
        gloo_timers::callback::Timeout::new(ms, move || {
            if toasts.try_with_value(|t| t.is_shown(level, id)).unwrap_or(false) {
                signal.set(None);
            }
        })
        .forget();
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.notify(Notification::success(message));
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.notify(Notification::error(message));
    }

    /// Surface a failed call.
    ///
    /// An authorization failure also drops the session, which sends every
    /// guarded view back to login.
    pub fn report(&self, err: &ClientError, fallback: &str) {
        web_sys::console::error_1(&format!("{}: {}", fallback, err).into());
        if err.requires_login() {
            self.sign_out();
        }
        self.notify(Notification::from_error(err, fallback));
    }

    /// Clear error message
    pub fn clear_error(&self) {
        self.error.set(None);
    }
}
