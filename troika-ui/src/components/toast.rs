//! Toast Notification Component
//!
//! Shows success, info and error messages.

use leptos::*;
use troika::Level;

use crate::state::global::use_global_state;

/// Toast notification container
#[component]
pub fn Toast() -> impl IntoView {
    let state = use_global_state();

    view! {
        <div class="fixed bottom-4 right-4 z-50 space-y-2">
            {move || {
                state.success.get().map(|msg| view! {
                    <ToastMessage message=msg level=Level::Success />
                })
            }}

            {move || {
                state.info.get().map(|msg| view! {
                    <ToastMessage message=msg level=Level::Info />
                })
            }}

            // Error toast; click to dismiss early
            {move || {
                state.error.get().map(|msg| view! {
                    <div on:click=move |_| state.clear_error() class="cursor-pointer">
                        <ToastMessage message=msg level=Level::Error />
                    </div>
                })
            }}
        </div>
    }
}

#[component]
fn ToastMessage(
    #[prop(into)]
    message: String,
    level: Level,
) -> impl IntoView {
    let (icon, bg_class) = match level {
        Level::Success => ("✓", "bg-green-600"),
        Level::Error => ("✕", "bg-red-600"),
        Level::Info => ("ℹ", "bg-blue-600"),
    };

    view! {
        <div class=format!(
            "flex items-center space-x-3 {} text-white px-4 py-3 rounded-lg shadow-lg \
             transform transition-all duration-300 ease-out animate-slide-in",
            bg_class
        )>
            <span class="text-lg">{icon}</span>
            <span class="text-sm font-medium">{message}</span>
        </div>
    }
}
