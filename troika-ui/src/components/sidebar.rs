//! Sidebar Navigation
//!
//! Menu of the views available to the signed-in role, and logout.

use leptos::*;
use leptos_router::*;
use troika::{Role, Route};

use crate::state::global::use_global_state;

#[component]
pub fn Sidebar(role: Role) -> impl IntoView {
    let state = use_global_state();
    let navigate = use_navigate();

    let logout = move |_| {
        state.sign_out();
        navigate(Route::Login.path(), Default::default());
    };

    let heading = match role {
        Role::Admin => "Troika Admin",
        Role::User => "Troika",
    };

    view! {
        <aside class="w-64 bg-gray-900 text-white flex flex-col">
            <div class="h-16 flex items-center px-6 space-x-3 border-b border-gray-800">
                <span class="text-2xl">"🤖"</span>
                <span class="text-xl font-bold">{heading}</span>
            </div>

            <nav class="flex-1 px-3 py-4 space-y-1">
                {Route::menu(role)
                    .into_iter()
                    .map(|route| view! { <NavLink href=route.path() label=route.title() /> })
                    .collect_view()}
            </nav>

            <button
                on:click=logout
                class="m-4 px-4 py-2 bg-red-600 hover:bg-red-700 rounded-lg font-medium transition-colors"
            >
                "Logout"
            </button>
        </aside>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: &'static str,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A
            href=href
            class="block px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-800 transition-colors"
            active_class="bg-gray-800 text-white"
        >
            {label}
        </A>
    }
}
