//! Manage Companies Page
//!
//! Company list with search, creation, deletion, and chatbot creation for
//! a company.

use leptos::*;

use troika::forms::{self, NewCompanyForm};
use troika::Company;

use crate::api;
use crate::components::ListSkeleton;
use crate::state::global::{use_global_state, GlobalState};

const LOAD_FAILED: &str = "Failed to fetch companies";

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn prompt(message: &str, default: &str) -> Option<String> {
    web_sys::window()?
        .prompt_with_message_and_default(message, default)
        .ok()
        .flatten()
}

#[component]
pub fn Companies() -> impl IntoView {
    let state = use_global_state();

    let companies = create_rw_signal(Vec::<Company>::new());
    let (loading, set_loading) = create_signal(true);
    let (search, set_search) = create_signal(String::new());

    let reload = move || {
        set_loading.set(true);
        spawn_local(async move {
            match api::fetch_companies().await {
                Ok(list) => companies.set(list),
                Err(e) => state.report(&e, LOAD_FAILED),
            }
            set_loading.set(false);
        });
    };
    reload();

    let visible = move || {
        let search = search.get();
        companies.with(|all| {
            all.iter()
                .filter(|c| c.matches(&search))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Manage Companies"</h1>

            <CreateCompany on_created=Callback::new(move |_| reload()) />

            <input
                type="text"
                placeholder="Search companies..."
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
                                <th class="px-4 py-3">"Domain"</th>
                                <th class="px-4 py-3">"Email"</th>
                                <th class="px-4 py-3">"Chatbot"</th>
                                <th class="px-4 py-3">"Actions"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=visible
                                key=|c| c.id.clone()
                                children=move |company| view! {
                                    <CompanyRow company=company state=state on_change=Callback::new(move |_| reload()) />
                                }
                            />
                        </tbody>
                    </table>
                }.into_view()
            }}
        </div>
    }
}

#[component]
fn CompanyRow(company: Company, state: GlobalState, on_change: Callback<()>) -> impl IntoView {
    let company = store_value(company);
    let (working, set_working) = create_signal(false);

    let delete_company = move |_| {
        let company = company.get_value();
        if !confirm(&format!("Delete {} and all of its chatbots?", company.name)) {
            return;
        }
        set_working.set(true);
        spawn_local(async move {
            match api::delete_company(&company.id).await {
                Ok(()) => {
                    state.show_success("Company deleted");
                    on_change.call(());
                }
                Err(e) => state.report(&e, "Failed to delete company"),
            }
            set_working.set(false);
        });
    };

    let add_chatbot = move |_| {
        let company = company.get_value();
        let Some(name) = prompt("Chatbot name", &forms::default_chatbot_name(&company.name)) else {
            return;
        };
        let chatbot = match forms::new_chatbot(&company, Some(&name)) {
            Ok(chatbot) => chatbot,
            Err(e) => return state.show_error(&e.to_string()),
        };
        set_working.set(true);
        spawn_local(async move {
            match api::create_chatbot(&chatbot).await {
                Ok(()) => {
                    state.show_success("Chatbot created");
                    on_change.call(());
                }
                Err(e) => state.report(&e, "Failed to create chatbot"),
            }
            set_working.set(false);
        });
    };

    let delete_chatbot = move |chatbot_id: String| {
        if !confirm("Delete this chatbot?") {
            return;
        }
        set_working.set(true);
        spawn_local(async move {
            match api::delete_chatbot(&chatbot_id).await {
                Ok(()) => {
                    state.show_success("Chatbot deleted");
                    on_change.call(());
                }
                Err(e) => state.report(&e, "Failed to delete chatbot"),
            }
            set_working.set(false);
        });
    };

    let current = company.get_value();
    let chatbot = current.primary_chatbot().cloned();

    view! {
        <tr class="border-t">
            <td class="px-4 py-3 font-medium">{current.name.clone()}</td>
            <td class="px-4 py-3">{current.url.clone()}</td>
            <td class="px-4 py-3">{current.email.clone()}</td>
            <td class="px-4 py-3">
                {match chatbot {
                    Some(bot) => {
                        let id = bot.id.clone();
                        view! {
                            <span class="mr-2">{bot.name}</span>
                            <button
                                class="text-red-600 hover:underline"
                                disabled=move || working.get()
                                on:click=move |_| delete_chatbot(id.clone())
                            >
                                "Delete"
                            </button>
                        }.into_view()
                    }
                    None => view! {
                        <button
                            class="text-indigo-600 hover:underline"
                            disabled=move || working.get()
                            on:click=add_chatbot
                        >
                            "Add Chatbot"
                        </button>
                    }.into_view(),
                }}
            </td>
            <td class="px-4 py-3">
                <button
                    class="px-3 py-1 bg-red-600 hover:bg-red-700 disabled:bg-gray-400 text-white rounded-lg"
                    disabled=move || working.get()
                    on:click=delete_company
                >
                    "Delete"
                </button>
            </td>
        </tr>
    }
}

#[component]
fn CreateCompany(on_created: Callback<()>) -> impl IntoView {
    let state = use_global_state();
    let form = create_rw_signal(NewCompanyForm::default());
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let company = match form.with_untracked(NewCompanyForm::validate) {
            Ok(company) => company,
            Err(e) => return state.show_error(&e.to_string()),
        };
        set_submitting.set(true);
        spawn_local(async move {
            match api::create_company(&company).await {
                Ok(()) => {
                    state.show_success("Company created");
                    form.set(NewCompanyForm::default());
                    on_created.call(());
                }
                Err(e) => state.report(&e, "Failed to create company"),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form on:submit=on_submit class="bg-white rounded-xl shadow p-6 grid grid-cols-1 md:grid-cols-5 gap-3">
            <input type="text" placeholder="Company name" class="border rounded-lg px-3 py-2"
                prop:value=move || form.with(|f| f.name.clone())
                on:input=move |ev| form.update(|f| f.name = event_target_value(&ev)) />
            <input type="text" placeholder="Domain" class="border rounded-lg px-3 py-2"
                prop:value=move || form.with(|f| f.url.clone())
                on:input=move |ev| form.update(|f| f.url = event_target_value(&ev)) />
            <input type="email" placeholder="Email" class="border rounded-lg px-3 py-2"
                prop:value=move || form.with(|f| f.email.clone())
                on:input=move |ev| form.update(|f| f.email = event_target_value(&ev)) />
            <input type="password" placeholder="Password" class="border rounded-lg px-3 py-2"
                prop:value=move || form.with(|f| f.password.clone())
                on:input=move |ev| form.update(|f| f.password = event_target_value(&ev)) />
            <button
                type="submit"
                disabled=move || submitting.get()
                class="px-4 py-2 bg-indigo-600 hover:bg-indigo-700 disabled:bg-gray-400 text-white rounded-lg font-medium"
            >
                {move || if submitting.get() { "Creating..." } else { "Add Company" }}
            </button>
        </form>
    }
}
