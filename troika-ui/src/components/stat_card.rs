//! Stat Card Component

use leptos::*;

/// A labelled counter on the overview pages
#[component]
pub fn StatCard(
    label: &'static str,
    icon: &'static str,
    #[prop(into)]
    value: Signal<String>,
) -> impl IntoView {
    view! {
        <div class="bg-white rounded-xl shadow p-5 flex items-center space-x-4">
            <div class="text-3xl">{icon}</div>
            <div>
                <p class="text-sm text-gray-500">{label}</p>
                <p class="text-2xl font-bold text-gray-900">{move || value.get()}</p>
            </div>
        </div>
    }
}
