//! Login Page
//!
//! Admin sign-in. A session that is already valid skips straight to its
//! home view.

use leptos::*;
use leptos_router::*;
use troika::{Role, Route};

use crate::api;
use crate::state::global::use_global_state;

const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[component]
pub fn Login() -> impl IntoView {
    let state = use_global_state();
    let navigate = use_navigate();

    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_submitting.set(true);

        let navigate = navigate.clone();
        spawn_local(async move {
            let result = match api::login(&email.get_untracked(), &password.get_untracked()).await {
                Ok(token) => state.sign_in(&token, Role::Admin),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => {
                    state.show_success("Logged in");
                    navigate(Route::home(Role::Admin).path(), Default::default());
                }
                Err(e) => state.report(&e, LOGIN_FAILED),
            }
            set_submitting.set(false);
        });
    };

    view! {
        {state.session.get_untracked().map(|session| {
            view! { <Redirect path=Route::home(session.role).path() /> }
        })}

        <div class="min-h-screen flex items-center justify-center bg-gray-100">
            <form on:submit=on_submit class="bg-white rounded-xl shadow p-8 w-full max-w-sm space-y-4">
                <h1 class="text-2xl font-bold text-center">"Troika Admin"</h1>

                <input
                    type="email"
                    placeholder="Email"
                    required
                    class="w-full border rounded-lg px-3 py-2"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    required
                    class="w-full border rounded-lg px-3 py-2"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />

                <button
                    type="submit"
                    disabled=move || submitting.get()
                    class="w-full py-2 bg-indigo-600 hover:bg-indigo-700 disabled:bg-gray-400
                           text-white rounded-lg font-medium transition-colors"
                >
                    {move || if submitting.get() { "Signing in..." } else { "Login" }}
                </button>
            </form>
        </div>
    }
}
