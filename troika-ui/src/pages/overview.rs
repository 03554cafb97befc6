//! Admin Overview Page
//!
//! Platform-wide counters.

use leptos::*;

use crate::api;
use crate::components::{Loading, StatCard};
use crate::state::global::use_global_state;

#[component]
pub fn Overview() -> impl IntoView {
    let state = use_global_state();

    let stats = create_local_resource(
        || (),
        move |_| async move {
            let result = api::admin_stats().await;
            if let Err(e) = &result {
                state.report(e, "Failed to load stats");
            }
            result.ok()
        },
    );

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Overview"</h1>

            <Suspense fallback=|| view! { <Loading /> }>
                {move || stats.get().flatten().map(|stats| {
                    let cards = [
                        ("Total Chatbots", "🤖", stats.total_chatbots),
                        ("Total Companies", "🏢", stats.total_companies),
                        ("Unique Users", "👥", stats.unique_users),
                        ("Total Messages", "💬", stats.total_messages),
                        ("Monthly Token Usage", "🔢", stats.monthly_token_usage),
                    ];
                    view! {
                        <div class="grid grid-cols-1 md:grid-cols-3 lg:grid-cols-5 gap-4">
                            {cards.into_iter().map(|(label, icon, value)| view! {
                                <StatCard label=label icon=icon value=Signal::derive(move || value.to_string()) />
                            }).collect_view()}
                        </div>
                    }
                })}
            </Suspense>
        </div>
    }
}
