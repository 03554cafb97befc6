//! Session Store
//!
//! Holds the bearer token and role across views and restarts. Two key pairs
//! are persisted:
//!
//! - admin session: `adminToken` + `isAdmin`
//! - user session: `token` + `role`
//!
//! The store never inspects the token; it is opaque to the client.

mod storage;

pub use storage::{MemoryStorage, SessionStorage};

#[cfg(feature = "native")]
pub use storage::FileStorage;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

pub const ADMIN_TOKEN_KEY: &str = "adminToken";
pub const ADMIN_FLAG_KEY: &str = "isAdmin";
pub const USER_TOKEN_KEY: &str = "token";
pub const USER_ROLE_KEY: &str = "role";

/// Every key the store writes; all are removed on logout
pub const SESSION_KEYS: [&str; 4] = [ADMIN_TOKEN_KEY, ADMIN_FLAG_KEY, USER_TOKEN_KEY, USER_ROLE_KEY];

/// Role a protected view requires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(ClientError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// The current authenticated session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub is_admin: bool,
}

/// Read/write access to the persisted session keys
pub struct SessionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Store a freshly issued token for `role`, replacing any session held
    /// under the other role
    pub fn set_session(&self, token: &str, role: Role) -> ClientResult<()> {
        match role {
            Role::Admin => {
                self.storage.remove(USER_TOKEN_KEY)?;
                self.storage.remove(USER_ROLE_KEY)?;
                self.storage.set(ADMIN_TOKEN_KEY, token)?;
                self.storage.set(ADMIN_FLAG_KEY, "true")?;
            }
            Role::User => {
                self.storage.remove(ADMIN_TOKEN_KEY)?;
                self.storage.remove(ADMIN_FLAG_KEY)?;
                self.storage.set(USER_TOKEN_KEY, token)?;
                self.storage.set(USER_ROLE_KEY, role.as_str())?;
            }
        }
        tracing::info!(role = %role, "Session stored");
        Ok(())
    }

    /// Whether a non-empty admin token is stored with the admin flag set
    pub fn is_admin(&self) -> bool {
        self.storage.get(ADMIN_FLAG_KEY).as_deref() == Some("true")
            && non_empty(self.storage.get(ADMIN_TOKEN_KEY)).is_some()
    }

    /// Token of the active session; the admin session wins when both exist
    pub fn token(&self) -> Option<String> {
        if self.is_admin() {
            non_empty(self.storage.get(ADMIN_TOKEN_KEY))
        } else {
            non_empty(self.storage.get(USER_TOKEN_KEY))
        }
    }

    /// Role of the active session
    pub fn role(&self) -> Option<Role> {
        if self.is_admin() {
            return Some(Role::Admin);
        }
        let raw = self.storage.get(USER_ROLE_KEY)?;
        match raw.parse() {
            Ok(role) => Some(role),
            Err(_) => {
                tracing::warn!(role = %raw, "Ignoring unknown stored role");
                None
            }
        }
    }

    /// The active session, if token and role are both present
    pub fn session(&self) -> Option<Session> {
        let token = self.token()?;
        let role = self.role()?;
        Some(Session {
            token,
            role,
            is_admin: role == Role::Admin,
        })
    }

    /// Remove every session key
    pub fn clear_session(&self) -> ClientResult<()> {
        for key in SESSION_KEYS {
            self.storage.remove(key)?;
        }
        tracing::info!("Session cleared");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl SessionStore<Box<dyn SessionStorage + Send + Sync>> {
    /// Type-erased store, shareable across tasks
    pub fn boxed(storage: impl SessionStorage + Send + Sync + 'static) -> Self {
        Self::new(Box::new(storage))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
