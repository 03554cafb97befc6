//! User Dashboard Page
//!
//! Company, usage counters, plan health and report download for the
//! signed-in end user.

use leptos::*;

use troika::export::user_report_filename;
use troika::{PlanHealth, Subscription, Usage, UserCompany};

use crate::api;
use crate::components::{Loading, StatCard};
use crate::state::global::use_global_state;

#[component]
pub fn UserDashboard() -> impl IntoView {
    let state = use_global_state();

    let company = create_rw_signal(None::<UserCompany>);
    let usage = create_rw_signal(Usage::default());
    let subscription = create_rw_signal(None::<Subscription>);
    let (downloading, set_downloading) = create_signal(false);

    // company and usage load concurrently; loading ends when both are back
    let pending = create_rw_signal(2u8);
    let loading = move || pending.get() > 0;
    let finished = move || pending.update(|n| *n = n.saturating_sub(1));

    spawn_local(async move {
        match api::fetch_user_company().await {
            Ok(c) => {
                let chatbot_id = c.chatbot_id.clone();
                company.set(Some(c));
                if let Some(chatbot_id) = chatbot_id {
                    match api::fetch_subscription(&chatbot_id).await {
                        Ok(sub) => subscription.set(sub),
                        Err(e) => state.report(&e, "Failed to fetch subscription"),
                    }
                }
            }
            Err(e) => state.report(&e, "Failed to fetch company"),
        }
        finished();
    });

    spawn_local(async move {
        match api::fetch_user_usage().await {
            Ok(u) => usage.set(u),
            Err(e) => state.report(&e, "Failed to fetch usage"),
        }
        finished();
    });

    let download_report = move |_| {
        set_downloading.set(true);
        spawn_local(async move {
            let filename = user_report_filename(chrono::Utc::now().timestamp_millis());
            let result = api::download_user_report()
                .await
                .and_then(|bytes| api::trigger_download(&bytes, &filename, "application/pdf"));
            match result {
                Ok(()) => state.show_success("Report downloaded"),
                Err(e) => state.report(&e, "Failed to download report"),
            }
            set_downloading.set(false);
        });
    };

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <h1 class="text-3xl font-bold">
                    {move || company.with(|c| c.as_ref().map(|c| c.name.clone()).unwrap_or_else(|| "Overview".into()))}
                </h1>
                <button
                    on:click=download_report
                    disabled=move || downloading.get()
                    class="px-4 py-2 bg-gray-700 hover:bg-gray-800 disabled:bg-gray-400 text-white rounded-lg"
                >
                    {move || if downloading.get() { "Downloading..." } else { "Download Report" }}
                </button>
            </div>

            <Show when=move || !loading() fallback=|| view! { <Loading /> }>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <StatCard label="Total Messages" icon="💬"
                        value=Signal::derive(move || usage.with(|u| u.total_messages.to_string())) />
                    <StatCard label="Unique Users" icon="👥"
                        value=Signal::derive(move || usage.with(|u| u.unique_users.to_string())) />
                </div>
                <PlanCard subscription=subscription.read_only() />
            </Show>
        </div>
    }
}

/// Remaining plan time as a coloured bar
#[component]
fn PlanCard(subscription: ReadSignal<Option<Subscription>>) -> impl IntoView {
    view! {
        <div class="bg-white rounded-xl shadow p-6 space-y-3">
            <h2 class="text-lg font-semibold">"Plan"</h2>
            {move || match subscription.get() {
                None => view! { <p class="text-gray-500">"No active subscription"</p> }.into_view(),
                Some(sub) => {
                    let now = chrono::Utc::now();
                    let ratio = sub.remaining_ratio_at(now).unwrap_or(0.0);
                    let (bar, label) = match sub.health_at(now) {
                        Some(PlanHealth::Healthy) => ("bg-green-500", "Healthy"),
                        Some(PlanHealth::Warning) => ("bg-yellow-500", "Expiring soon"),
                        Some(PlanHealth::Critical) | None => ("bg-red-500", "Critical"),
                    };
                    view! {
                        <div class="flex items-center justify-between text-sm">
                            <span class="font-medium">{sub.plan_name().unwrap_or("Unknown plan").to_string()}</span>
                            <span>
                                {sub.days_remaining_at(now).map(|d| format!("{} days left", d)).unwrap_or_default()}
                            </span>
                        </div>
                        <div class="w-full h-3 bg-gray-200 rounded-full overflow-hidden">
                            <div
                                class=format!("h-3 {}", bar)
                                style=format!("width: {:.0}%", ratio * 100.0)
                            />
                        </div>
                        <div class="flex items-center justify-between text-xs text-gray-500">
                            <span>{label}</span>
                            <span>
                                {sub.max_users().map(|u| format!("{} users", u)).unwrap_or_default()}
                                " · "
                                {sub.end_date.map(|d| format!("ends {}", d.format("%Y-%m-%d"))).unwrap_or_default()}
                            </span>
                        </div>
                    }.into_view()
                }
            }}
        </div>
    }
}
