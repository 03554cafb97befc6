//! Manage Chatbots Page
//!
//! Chatbot list with search. Selecting a chatbot opens its panel:
//! subscription, token limit, plan renewal, widget config, message history
//! with CSV export, report download and context upload.

use leptos::*;

use troika::export::{chatbot_report_filename, messages_to_csv, MESSAGES_CSV_FILENAME};
use troika::forms::{self, ClientConfigForm};
use troika::{Chatbot, Message, Plan, Subscription};

use crate::api;
use crate::components::{InlineLoading, ListSkeleton, Modal, UploadButton};
use crate::state::global::use_global_state;

#[component]
pub fn Chatbots() -> impl IntoView {
    let state = use_global_state();

    let chatbots = create_rw_signal(Vec::<Chatbot>::new());
    let (loading, set_loading) = create_signal(true);
    let (search, set_search) = create_signal(String::new());
    let selected = create_rw_signal(None::<Chatbot>);

    let reload = move || {
        set_loading.set(true);
        spawn_local(async move {
            match api::fetch_chatbots().await {
                Ok(list) => chatbots.set(list),
                Err(e) => state.report(&e, "Failed to fetch chatbots"),
            }
            set_loading.set(false);
        });
    };
    reload();

    let visible = move || {
        let search = search.get();
        chatbots.with(|all| {
            all.iter()
                .filter(|b| b.matches(&search))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Manage Chatbots"</h1>

            <input
                type="text"
                placeholder="Search chatbots..."
                class="w-full md:w-80 border rounded-lg px-3 py-2"
                on:input=move |ev| set_search.set(event_target_value(&ev))
            />

            {move || if loading.get() {
                view! { <ListSkeleton count=5 /> }.into_view()
            } else {
                view! {
                    <table class="min-w-full bg-white rounded-xl shadow text-sm">
                        <thead class="bg-gray-50 text-left">
                            <tr>
                                <th class="px-4 py-3">"Name"</th>
                                <th class="px-4 py-3">"Company"</th>
                                <th class="px-4 py-3">"Token Limit"</th>
                                <th class="px-4 py-3">"Used"</th>
                                <th class="px-4 py-3">"Remaining"</th>
                                <th class="px-4 py-3">"Messages"</th>
                                <th class="px-4 py-3"></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=visible
                                key=|b| b.id.clone()
                                children=move |bot| {
                                    let open = bot.clone();
                                    view! {
                                        <tr class="border-t">
                                            <td class="px-4 py-3 font-medium">{bot.name.clone()}</td>
                                            <td class="px-4 py-3">{bot.company_name.clone().unwrap_or_default()}</td>
                                            <td class="px-4 py-3">{bot.token_limit_label()}</td>
                                            <td class="px-4 py-3">{bot.used_tokens.unwrap_or(0)}</td>
                                            <td class="px-4 py-3">{bot.remaining_tokens().to_string()}</td>
                                            <td class="px-4 py-3">{bot.total_messages.unwrap_or(0)}</td>
                                            <td class="px-4 py-3">
                                                <button
                                                    class="text-indigo-600 hover:underline"
                                                    on:click=move |_| selected.set(Some(open.clone()))
                                                >
                                                    "Manage"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                }.into_view()
            }}

            {move || selected.get().map(|bot| view! {
                <Modal
                    title=bot.name.clone()
                    on_close=Callback::new(move |_| selected.set(None))
                >
                    <ChatbotPanel chatbot=bot.clone() on_change=Callback::new(move |_| reload()) />
                </Modal>
            })}
        </div>
    }
}

#[component]
fn ChatbotPanel(chatbot: Chatbot, on_change: Callback<()>) -> impl IntoView {
    let id = chatbot.id.clone();

    view! {
        <div class="space-y-6">
            <SubscriptionSection chatbot_id=id.clone() />
            <TokenLimitSection chatbot=chatbot on_change=on_change />
            <ConfigSection chatbot_id=id.clone() />
            <MessagesSection chatbot_id=id.clone() />
            <div class="flex items-center space-x-3">
                <ReportButton chatbot_id=id.clone() />
                <UploadButton chatbot_id=id />
            </div>
        </div>
    }
}

#[component]
fn SubscriptionSection(chatbot_id: String) -> impl IntoView {
    let state = use_global_state();
    let id = store_value(chatbot_id);
    let subscription = create_rw_signal(None::<Subscription>);
    let plans = create_rw_signal(Vec::<Plan>::new());
    let (selected_plan, set_selected_plan) = create_signal(String::new());
    let (renewing, set_renewing) = create_signal(false);

    let load = move || {
        spawn_local(async move {
            match api::fetch_subscription(&id.get_value()).await {
                Ok(sub) => subscription.set(sub),
                Err(e) => state.report(&e, "Failed to fetch subscription"),
            }
        });
    };
    load();

    spawn_local(async move {
        match api::fetch_plans().await {
            Ok(list) => plans.set(list),
            Err(e) => state.report(&e, "Failed to fetch plans"),
        }
    });

    let renew = move |_| {
        let selected = selected_plan.get_untracked();
        let request = match plans.with_untracked(|p| forms::renewal_request(p, Some(&selected))) {
            Ok(request) => request,
            Err(e) => return state.show_error(&e.to_string()),
        };
        set_renewing.set(true);
        spawn_local(async move {
            match api::renew_plan(&id.get_value(), &request).await {
                Ok(()) => {
                    state.show_success("Plan renewed");
                    load();
                }
                Err(e) => state.report(&e, "Failed to renew plan"),
            }
            set_renewing.set(false);
        });
    };

    view! {
        <section class="space-y-2">
            <h4 class="font-semibold">"Subscription"</h4>
            {move || match subscription.get() {
                Some(sub) => {
                    let now = chrono::Utc::now();
                    view! {
                        <p class="text-sm">
                            {sub.plan_name().unwrap_or("Unknown plan").to_string()}
                            " · "
                            {sub.days_remaining_at(now).map(|d| format!("{} days left", d)).unwrap_or_default()}
                            " · "
                            {sub.end_date.map(|d| format!("ends {}", d.format("%Y-%m-%d"))).unwrap_or_default()}
                        </p>
                    }.into_view()
                }
                None => view! { <p class="text-sm text-gray-500">"No active subscription"</p> }.into_view(),
            }}

            <div class="flex items-center space-x-2">
                <select
                    class="border rounded-lg px-3 py-2 text-sm"
                    on:change=move |ev| set_selected_plan.set(event_target_value(&ev))
                >
                    <option value="">"Select a plan"</option>
                    {move || plans.get().into_iter().map(|plan| view! {
                        <option value=plan.id.clone()>{plan.label()}</option>
                    }).collect_view()}
                </select>
                <button
                    on:click=renew
                    disabled=move || renewing.get()
                    class="px-3 py-2 bg-green-600 hover:bg-green-700 disabled:bg-gray-400 text-white rounded-lg text-sm"
                >
                    {move || if renewing.get() { "Renewing..." } else { "Renew" }}
                </button>
            </div>
        </section>
    }
}

#[component]
fn TokenLimitSection(chatbot: Chatbot, on_change: Callback<()>) -> impl IntoView {
    let state = use_global_state();
    let id = store_value(chatbot.id.clone());
    let (input, set_input) = create_signal(chatbot.token_limit.map(|l| l.to_string()).unwrap_or_default());
    let (saving, set_saving) = create_signal(false);

    let save = move |_| {
        let limit = match forms::parse_token_limit(&input.get_untracked()) {
            Ok(limit) => limit,
            Err(e) => return state.show_error(&e.to_string()),
        };
        set_saving.set(true);
        spawn_local(async move {
            match api::update_token_limit(&id.get_value(), limit).await {
                Ok(()) => {
                    state.show_success("Token limit updated");
                    on_change.call(());
                }
                Err(e) => state.report(&e, "Failed to update token limit"),
            }
            set_saving.set(false);
        });
    };

    view! {
        <section class="space-y-2">
            <h4 class="font-semibold">"Token Limit"</h4>
            <p class="text-sm text-gray-600">
                "Remaining this month: " {chatbot.remaining_tokens().to_string()}
            </p>
            <div class="flex items-center space-x-2">
                <input
                    type="text"
                    inputmode="numeric"
                    class="border rounded-lg px-3 py-2 text-sm w-40"
                    prop:value=move || input.get()
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                />
                <button
                    on:click=save
                    disabled=move || saving.get()
                    class="px-3 py-2 bg-indigo-600 hover:bg-indigo-700 disabled:bg-gray-400 text-white rounded-lg text-sm"
                >
                    "Save"
                </button>
            </div>
        </section>
    }
}

#[component]
fn ConfigSection(chatbot_id: String) -> impl IntoView {
    let state = use_global_state();
    let id = store_value(chatbot_id);
    let form = create_rw_signal(ClientConfigForm::default());
    let (loaded, set_loaded) = create_signal(false);
    let (saving, set_saving) = create_signal(false);

    spawn_local(async move {
        match api::fetch_client_config(&id.get_value()).await {
            Ok(config) => form.set(ClientConfigForm::from(&config)),
            Err(e) => state.report(&e, "Failed to fetch config"),
        }
        set_loaded.set(true);
    });

    let save = move |_| {
        let config = form.with_untracked(ClientConfigForm::to_config);
        set_saving.set(true);
        spawn_local(async move {
            match api::update_client_config(&id.get_value(), &config).await {
                Ok(()) => {
                    form.set(ClientConfigForm::from(&config));
                    state.show_success("Config saved");
                }
                Err(e) => state.report(&e, "Failed to save config"),
            }
            set_saving.set(false);
        });
    };

    view! {
        <section class="space-y-2">
            <h4 class="font-semibold">"Widget Config"</h4>
            <Show when=move || loaded.get() fallback=|| view! { <InlineLoading /> }>
                <div class="grid grid-cols-1 gap-2 text-sm">
                    <input type="text" placeholder="Demo message" class="border rounded-lg px-3 py-2"
                        prop:value=move || form.with(|f| f.demo_message.clone())
                        on:input=move |ev| form.update(|f| f.demo_message = event_target_value(&ev)) />
                    <input type="text" placeholder="Demo link" class="border rounded-lg px-3 py-2"
                        prop:value=move || form.with(|f| f.demo_link.clone())
                        on:input=move |ev| form.update(|f| f.demo_link = event_target_value(&ev)) />
                    <input type="text" placeholder="Suggestions, comma separated" class="border rounded-lg px-3 py-2"
                        prop:value=move || form.with(|f| f.default_suggestions.clone())
                        on:input=move |ev| form.update(|f| f.default_suggestions = event_target_value(&ev)) />
                    <input type="text" placeholder="Keywords, comma separated" class="border rounded-lg px-3 py-2"
                        prop:value=move || form.with(|f| f.demo_keywords.clone())
                        on:input=move |ev| form.update(|f| f.demo_keywords = event_target_value(&ev)) />
                </div>
            </Show>
            <button
                on:click=save
                disabled=move || saving.get() || !loaded.get()
                class="px-3 py-2 bg-indigo-600 hover:bg-indigo-700 disabled:bg-gray-400 text-white rounded-lg text-sm"
            >
                "Save Config"
            </button>
        </section>
    }
}

#[component]
fn MessagesSection(chatbot_id: String) -> impl IntoView {
    let state = use_global_state();
    let id = store_value(chatbot_id);
    let messages = create_rw_signal(Vec::<Message>::new());
    let (loading, set_loading) = create_signal(true);

    spawn_local(async move {
        match api::fetch_chatbot_messages(&id.get_value()).await {
            Ok(list) => messages.set(list),
            Err(e) => state.report(&e, "Failed to fetch messages"),
        }
        set_loading.set(false);
    });

    let export_csv = move |_| {
        let result = messages
            .with_untracked(|m| messages_to_csv(m))
            .and_then(|csv| api::trigger_download(csv.as_bytes(), MESSAGES_CSV_FILENAME, "text/csv"));
        match result {
            Ok(()) => state.show_success("Messages exported"),
            Err(e) => state.report(&e, "Failed to export messages"),
        }
    };

    view! {
        <section class="space-y-2">
            <div class="flex items-center justify-between">
                <h4 class="font-semibold">"Messages"</h4>
                <button
                    on:click=export_csv
                    disabled=move || loading.get() || messages.with(Vec::is_empty)
                    class="px-3 py-1 bg-gray-200 hover:bg-gray-300 disabled:opacity-50 rounded-lg text-sm"
                >
                    "Export CSV"
                </button>
            </div>
            {move || if loading.get() {
                view! { <InlineLoading /> }.into_view()
            } else {
                view! {
                    <div class="max-h-64 overflow-y-auto space-y-1 text-sm">
                        {messages.get().into_iter().map(|m| view! {
                            <div class="flex space-x-2">
                                <span class="text-gray-400 w-36 shrink-0">
                                    {m.timestamp.format("%Y-%m-%d %H:%M").to_string()}
                                </span>
                                <span class="font-medium w-10 shrink-0">{m.sender.as_str()}</span>
                                <span>{m.content}</span>
                            </div>
                        }).collect_view()}
                    </div>
                }.into_view()
            }}
        </section>
    }
}

#[component]
fn ReportButton(chatbot_id: String) -> impl IntoView {
    let state = use_global_state();
    let id = store_value(chatbot_id);
    let (downloading, set_downloading) = create_signal(false);

    let download = move |_| {
        set_downloading.set(true);
        spawn_local(async move {
            let chatbot_id = id.get_value();
            let result = api::download_chatbot_report(&chatbot_id).await.and_then(|bytes| {
                api::trigger_download(&bytes, &chatbot_report_filename(&chatbot_id), "application/pdf")
            });
            match result {
                Ok(()) => state.show_success("Report downloaded"),
                Err(e) => state.report(&e, "Failed to download report"),
            }
            set_downloading.set(false);
        });
    };

    view! {
        <button
            on:click=download
            disabled=move || downloading.get()
            class="px-3 py-1 bg-gray-700 hover:bg-gray-800 disabled:bg-gray-400 text-white rounded-lg text-sm"
        >
            {move || if downloading.get() { "Downloading..." } else { "Download Report" }}
        </button>
    }
}
