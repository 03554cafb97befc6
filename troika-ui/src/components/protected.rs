//! Route guard wrapper
//!
//! Re-evaluates the guard whenever the published session changes, so a
//! logout anywhere sends every protected view back to login.

use leptos::*;
use leptos_router::*;
use troika::{protect, Guarded, Role};

use crate::components::Sidebar;
use crate::state::global::use_global_state;

/// Render `children` only for a session of `role`
#[component]
pub fn Protected(role: Role, children: ChildrenFn) -> impl IntoView {
    let state = use_global_state();

    move || {
        let session = state.session.get();
        match protect(role, session.as_ref(), Some(&children)) {
            Guarded::Render(Some(children)) => children().into_view(),
            Guarded::Render(None) => ().into_view(),
            Guarded::Redirect(route) => view! { <Redirect path=route.path() /> }.into_view(),
        }
    }
}

/// Sidebar plus page body, behind the guard for `role`
#[component]
pub fn DashboardLayout(role: Role, children: ChildrenFn) -> impl IntoView {
    view! {
        <Protected role=role>
            <div class="min-h-screen flex bg-gray-100">
                <Sidebar role=role />
                <main class="flex-1 p-8 overflow-x-auto">
                    {children()}
                </main>
            </div>
        </Protected>
    }
}
