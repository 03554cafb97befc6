//! Route Table
//!
//! Resolves a path to a view, applying the router's fixed redirects, then
//! runs the guard for protected views.

use crate::guard::{authorize, Access};
use crate::session::{Role, Session};

/// A renderable view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Overview,
    Companies,
    Chatbots,
    AddAdmin,
    UserDashboard,
    UserMessageHistory,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Overview,
        Route::Companies,
        Route::Chatbots,
        Route::AddAdmin,
        Route::UserDashboard,
        Route::UserMessageHistory,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Overview => "/dashboard/overview",
            Route::Companies => "/dashboard/companies",
            Route::Chatbots => "/dashboard/chatbots",
            Route::AddAdmin => "/dashboard/add-admin",
            Route::UserDashboard => "/user/dashboard",
            Route::UserMessageHistory => "/user/message-history",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Overview => "Overview",
            Route::Companies => "Manage Companies",
            Route::Chatbots => "Manage Chatbots",
            Route::AddAdmin => "Add Admin",
            Route::UserDashboard => "Overview",
            Route::UserMessageHistory => "Message History",
        }
    }

    /// Role required to enter, `None` for public views
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Login => None,
            Route::Overview | Route::Companies | Route::Chatbots | Route::AddAdmin => {
                Some(Role::Admin)
            }
            Route::UserDashboard | Route::UserMessageHistory => Some(Role::User),
        }
    }

    /// Landing view after authenticating as `role`
    pub fn home(role: Role) -> Route {
        match role {
            Role::Admin => Route::Overview,
            Role::User => Route::UserDashboard,
        }
    }

    /// Sidebar entries for `role`
    pub fn menu(role: Role) -> Vec<Route> {
        Self::ALL
            .into_iter()
            .filter(|r| r.required_role() == Some(role))
            .collect()
    }
}

/// Static path resolution before the guard runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolution {
    View(Route),
    Redirect(&'static str),
}

fn resolve(path: &str) -> Resolution {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    let path = if trimmed.is_empty() { "/" } else { trimmed };

    if path == "/dashboard" {
        return Resolution::Redirect(Route::Overview.path());
    }

    Route::ALL
        .into_iter()
        .find(|r| r.path() == path)
        .map(Resolution::View)
        .unwrap_or(Resolution::Redirect(Route::Login.path()))
}

/// Navigation decision for a requested path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// The requested path renders as-is
    Render(Route),
    /// The requested path ends up somewhere else
    Redirect(Route),
}

impl Navigation {
    /// The view that is finally shown
    pub fn route(&self) -> Route {
        match self {
            Navigation::Render(r) | Navigation::Redirect(r) => *r,
        }
    }
}

/// Resolve `path` and apply the guard against `session`
pub fn navigate(path: &str, session: Option<&Session>) -> Navigation {
    let mut current = path.to_string();
    let mut redirected = false;

    // The table has at most two hops (/dashboard -> overview -> login).
    for _ in 0..4 {
        match resolve(&current) {
            Resolution::Redirect(to) => {
                current = to.to_string();
                redirected = true;
            }
            Resolution::View(route) => {
                if let Some(required) = route.required_role() {
                    if let Access::Denied(_) = authorize(required, session) {
                        tracing::debug!(path = %path, "Protected route denied");
                        return Navigation::Redirect(Route::Login);
                    }
                }
                return if redirected {
                    Navigation::Redirect(route)
                } else {
                    Navigation::Render(route)
                };
            }
        }
    }

    Navigation::Redirect(Route::Login)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Session {
        Session {
            token: "abc".into(),
            role: Role::Admin,
            is_admin: true,
        }
    }

    fn user() -> Session {
        Session {
            token: "u".into(),
            role: Role::User,
            is_admin: false,
        }
    }

    #[test]
    fn test_dashboard_root_redirects_to_overview() {
        assert_eq!(navigate("/dashboard", Some(&admin())), Navigation::Redirect(Route::Overview));
        assert_eq!(navigate("/dashboard/", Some(&admin())), Navigation::Redirect(Route::Overview));
    }

    #[test]
    fn test_protected_routes_require_session() {
        for route in Route::ALL {
            let nav = navigate(route.path(), None);
            if route == Route::Login {
                assert_eq!(nav, Navigation::Render(Route::Login));
            } else {
                assert_eq!(nav, Navigation::Redirect(Route::Login), "{:?}", route);
            }
        }
    }

    #[test]
    fn test_roles_see_only_their_views() {
        assert_eq!(navigate("/dashboard/companies", Some(&admin())), Navigation::Render(Route::Companies));
        assert_eq!(navigate("/dashboard/companies", Some(&user())), Navigation::Redirect(Route::Login));
        assert_eq!(navigate("/user/dashboard", Some(&user())), Navigation::Render(Route::UserDashboard));
        assert_eq!(navigate("/user/dashboard", Some(&admin())), Navigation::Redirect(Route::Login));
    }

    #[test]
    fn test_unknown_paths_go_to_login() {
        assert_eq!(navigate("/nope", Some(&admin())), Navigation::Redirect(Route::Login));
        assert_eq!(navigate("", None), Navigation::Render(Route::Login));
    }

    #[test]
    fn test_query_string_ignored() {
        assert_eq!(
            navigate("/user/message-history?page=2", Some(&user())),
            Navigation::Render(Route::UserMessageHistory)
        );
    }

    #[test]
    fn test_menu_per_role() {
        assert_eq!(
            Route::menu(Role::Admin),
            vec![Route::Overview, Route::Companies, Route::Chatbots, Route::AddAdmin]
        );
        assert_eq!(Route::menu(Role::User), vec![Route::UserDashboard, Route::UserMessageHistory]);
        assert_eq!(Route::home(Role::User), Route::UserDashboard);
    }

    #[test]
    fn test_logout_revokes_access() {
        use crate::session::{MemoryStorage, SessionStore};

        let store = SessionStore::new(MemoryStorage::default());
        store.set_session("abc", Role::Admin).unwrap();
        assert_eq!(
            navigate("/dashboard/chatbots", store.session().as_ref()),
            Navigation::Render(Route::Chatbots)
        );

        store.clear_session().unwrap();
        assert_eq!(
            navigate("/dashboard/chatbots", store.session().as_ref()),
            Navigation::Redirect(Route::Login)
        );
    }
}
