//! Route Guard
//!
//! Pure, synchronous access decision for protected views. Callers evaluate it
//! on every route entry; nothing is cached between navigations.

use crate::routes::Route;
use crate::session::{Role, Session};

/// Outcome of checking a session against a required role
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied(DenyReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// No session or an empty token
    NoSession,
    /// Session present but for another role
    RoleMismatch { required: Role, actual: Role },
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// Grant iff the token is non-empty and the role matches exactly
pub fn authorize(required: Role, session: Option<&Session>) -> Access {
    match session {
        Some(session) if !session.token.trim().is_empty() => {
            if session.role == required {
                Access::Granted
            } else {
                Access::Denied(DenyReason::RoleMismatch {
                    required,
                    actual: session.role,
                })
            }
        }
        _ => Access::Denied(DenyReason::NoSession),
    }
}

/// What to do with a guarded subtree
#[derive(Debug, PartialEq)]
pub enum Guarded<V> {
    /// Render the wrapped content
    Render(V),
    /// Discard the content and go to `route`
    Redirect(Route),
}

/// Wrap `content` behind the guard.
///
/// Missing content is a caller bug: it is logged, and the role check still
/// applies so a malformed wrapper can never bypass it.
pub fn protect<V>(required: Role, session: Option<&Session>, content: Option<V>) -> Guarded<Option<V>> {
    if content.is_none() {
        tracing::error!(required = %required, "Invalid content passed to route guard");
    }

    match authorize(required, session) {
        Access::Granted => Guarded::Render(content),
        Access::Denied(reason) => {
            tracing::debug!(required = %required, reason = ?reason, "Access denied, redirecting to login");
            Guarded::Redirect(Route::Login)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str, role: Role) -> Session {
        Session {
            token: token.to_string(),
            role,
            is_admin: role == Role::Admin,
        }
    }

    #[test]
    fn test_grant_iff_token_and_role_match() {
        let roles = [Role::Admin, Role::User];
        let tokens = ["", " ", "abc"];

        for required in roles {
            assert_eq!(authorize(required, None), Access::Denied(DenyReason::NoSession));

            for actual in roles {
                for token in tokens {
                    let s = session(token, actual);
                    let expected = !token.trim().is_empty() && actual == required;
                    assert_eq!(
                        authorize(required, Some(&s)).is_granted(),
                        expected,
                        "required={:?} actual={:?} token={:?}",
                        required,
                        actual,
                        token
                    );
                }
            }
        }
    }

    #[test]
    fn test_role_mismatch_reason() {
        let s = session("abc", Role::User);
        assert_eq!(
            authorize(Role::Admin, Some(&s)),
            Access::Denied(DenyReason::RoleMismatch {
                required: Role::Admin,
                actual: Role::User
            })
        );
    }

    #[test]
    fn test_protect_discards_content_on_denial() {
        let result = protect(Role::Admin, None, Some("secret view"));
        assert_eq!(result, Guarded::Redirect(Route::Login));
    }

    #[test]
    fn test_protect_renders_content() {
        let s = session("abc", Role::Admin);
        assert_eq!(
            protect(Role::Admin, Some(&s), Some("view")),
            Guarded::Render(Some("view"))
        );
    }

    #[test]
    fn test_missing_content_still_checks_role() {
        let s = session("abc", Role::User);
        assert_eq!(
            protect::<&str>(Role::Admin, Some(&s), None),
            Guarded::Redirect(Route::Login)
        );
        assert_eq!(protect::<&str>(Role::User, Some(&s), None), Guarded::Render(None));
    }
}
