//! Message History Page
//!
//! Paginated message history filtered by session or email. Every change to
//! the page or the filter restarts a debounce timer; only the fetch issued
//! last may update the table.

use gloo_timers::callback::Timeout;
use leptos::*;

use troika::export::chat_pdf_filename;
use troika::notify::FETCH_FAILED;
use troika::{
    FilterKind, FilterState, Message, MessageQuery, PageInfo, RequestSequencer, Sender,
    DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE,
};

use crate::api;
use crate::components::{InlineLoading, ListSkeleton, Modal, Paginator};
use crate::state::global::use_global_state;

/// What the conversation modal is showing
#[derive(Clone, Debug, PartialEq)]
enum Conversation {
    Session(String),
    Email(String),
}

impl Conversation {
    fn title(&self) -> String {
        match self {
            Conversation::Session(id) => format!("Session {}", id),
            Conversation::Email(email) => format!("Chat with {}", email),
        }
    }

    fn query(&self) -> MessageQuery {
        match self {
            Conversation::Session(id) => MessageQuery::conversation_for_session(id.clone()),
            Conversation::Email(email) => MessageQuery::conversation_for_email(email.clone()),
        }
    }
}

#[component]
pub fn MessageHistory() -> impl IntoView {
    let state = use_global_state();

    let filter = create_rw_signal(FilterState::new());
    let messages = create_rw_signal(Vec::<Message>::new());
    let page_info = create_rw_signal(PageInfo::default());
    let (loading, set_loading) = create_signal(true);

    let sessions = create_rw_signal(Vec::<String>::new());
    let emails = create_rw_signal(Vec::<String>::new());
    let conversation = create_rw_signal(None::<Conversation>);

    let sequencer = store_value(RequestSequencer::new());
    let pending = store_value(None::<Timeout>);

    spawn_local(async move {
        match api::fetch_sessions().await {
            Ok(list) => sessions.set(list),
            Err(e) => state.report(&e, "Failed to fetch sessions"),
        }
    });
    spawn_local(async move {
        match api::fetch_unique_emails().await {
            Ok(list) => emails.set(list),
            Err(e) => state.report(&e, "Failed to fetch emails"),
        }
    });

    create_effect(move |_| {
        let query = filter.with(|f| f.query(DEFAULT_PAGE_SIZE));
        let timer = Timeout::new(DEFAULT_DEBOUNCE_MS as u32, move || {
            let ticket = sequencer.with_value(RequestSequencer::issue);
            set_loading.set(true);

            spawn_local(async move {
                let result = api::fetch_messages(&query).await;
                if !sequencer.try_with_value(|s| s.is_current(ticket)).unwrap_or(false) {
                    web_sys::console::debug_1(
                        &format!("Discarding stale message page (ticket {})", ticket.id()).into(),
                    );
                    return;
                }
                match result {
                    Ok(page) => {
                        let requested = query.page.unwrap_or(1);
                        page_info.set(PageInfo::new(requested, page.total_pages.unwrap_or(1)));
                        messages.set(page.messages);
                    }
                    Err(e) => state.report(&e, FETCH_FAILED),
                }
                set_loading.set(false);
            });
        });
        // replacing the pending timer cancels it
        pending.set_value(Some(timer));
    });

    let options = move || match filter.with(FilterState::kind) {
        FilterKind::Session => sessions.get(),
        FilterKind::Email => emails.get(),
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Message History"</h1>

            <div class="flex flex-wrap items-center gap-3">
                <select
                    class="border rounded-lg px-3 py-2"
                    on:change=move |ev| {
                        if let Ok(kind) = event_target_value(&ev).parse::<FilterKind>() {
                            filter.update(|f| f.set_kind(kind));
                            page_info.set(PageInfo::default());
                        }
                    }
                >
                    <option value="email" selected=move || filter.with(|f| f.kind() == FilterKind::Email)>
                        "Email"
                    </option>
                    <option value="session" selected=move || filter.with(|f| f.kind() == FilterKind::Session)>
                        "Session"
                    </option>
                </select>

                <input
                    type="text"
                    list="filter-options"
                    class="border rounded-lg px-3 py-2 w-80"
                    placeholder=move || match filter.with(FilterState::kind) {
                        FilterKind::Session => "Filter by session ID",
                        FilterKind::Email => "Filter by email",
                    }
                    prop:value=move || filter.with(|f| f.filter().to_string())
                    on:input=move |ev| {
                        filter.update(|f| f.set_filter(event_target_value(&ev)));
                        page_info.set(PageInfo::default());
                    }
                />
                <datalist id="filter-options">
                    {move || options().into_iter().map(|o| view! { <option value=o /> }).collect_view()}
                </datalist>

                <button
                    class="px-3 py-2 bg-gray-200 hover:bg-gray-300 rounded-lg"
                    on:click=move |_| {
                        filter.update(FilterState::clear_filter);
                        page_info.set(PageInfo::default());
                    }
                >
                    "Clear"
                </button>

                {move || loading.get().then(|| view! { <InlineLoading /> })}
            </div>

            {move || if loading.get() && messages.with(Vec::is_empty) {
                view! { <ListSkeleton count=5 /> }.into_view()
            } else {
                view! {
                    <table class="min-w-full bg-white rounded-xl shadow text-sm">
                        <thead class="bg-gray-50 text-left">
                            <tr>
                                <th class="px-4 py-3">"Time"</th>
                                <th class="px-4 py-3">"From"</th>
                                <th class="px-4 py-3">"Message"</th>
                                <th class="px-4 py-3">"Session"</th>
                                <th class="px-4 py-3">"Email"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {messages.get().into_iter().map(|m| {
                                let session = m.session_id.clone();
                                let email = m.email.clone();
                                view! {
                                    <tr class="border-t">
                                        <td class="px-4 py-3 whitespace-nowrap">
                                            {m.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()}
                                        </td>
                                        <td class="px-4 py-3">{m.sender.as_str()}</td>
                                        <td class="px-4 py-3">{m.content.clone()}</td>
                                        <td class="px-4 py-3">
                                            {session.map(|id| {
                                                let open = Conversation::Session(id.clone());
                                                view! {
                                                    <button class="text-indigo-600 hover:underline"
                                                        on:click=move |_| conversation.set(Some(open.clone()))>
                                                        {id}
                                                    </button>
                                                }
                                            })}
                                        </td>
                                        <td class="px-4 py-3">
                                            {email.map(|email| {
                                                let open = Conversation::Email(email.clone());
                                                view! {
                                                    <button class="text-indigo-600 hover:underline"
                                                        on:click=move |_| conversation.set(Some(open.clone()))>
                                                        {email}
                                                    </button>
                                                }
                                            })}
                                        </td>
                                    </tr>
                                }
                            }).collect_view()}
                        </tbody>
                    </table>
                }.into_view()
            }}

            <Paginator
                info=Signal::derive(move || page_info.get().at(filter.with(FilterState::page)))
                on_page=Callback::new(move |page| filter.update(|f| f.set_page(page)))
            />

            {move || conversation.get().map(|c| view! {
                <Modal title=c.title() on_close=Callback::new(move |_| conversation.set(None))>
                    <ConversationView conversation=c.clone() />
                </Modal>
            })}
        </div>
    }
}

/// Full conversation for one session or email
#[component]
fn ConversationView(conversation: Conversation) -> impl IntoView {
    let state = use_global_state();
    let messages = create_rw_signal(Vec::<Message>::new());
    let (loading, set_loading) = create_signal(true);
    let (downloading, set_downloading) = create_signal(false);

    let query = conversation.query();
    spawn_local(async move {
        match api::fetch_messages(&query).await {
            Ok(page) => messages.set(page.messages),
            Err(e) => state.report(&e, FETCH_FAILED),
        }
        set_loading.set(false);
    });

    let pdf_button = match conversation {
        Conversation::Email(email) => {
            let email = store_value(email);
            let download = move |_| {
                set_downloading.set(true);
                spawn_local(async move {
                    let email = email.get_value();
                    let result = api::download_email_pdf(&email).await.and_then(|bytes| {
                        api::trigger_download(&bytes, &chat_pdf_filename(&email), "application/pdf")
                    });
                    match result {
                        Ok(()) => state.show_success("Chat downloaded"),
                        Err(e) => state.report(&e, "Failed to download chat"),
                    }
                    set_downloading.set(false);
                });
            };
            view! {
                <button
                    on:click=download
                    disabled=move || downloading.get()
                    class="mb-4 px-3 py-1 bg-gray-700 hover:bg-gray-800 disabled:bg-gray-400 text-white rounded-lg text-sm"
                >
                    {move || if downloading.get() { "Downloading..." } else { "Download PDF" }}
                </button>
            }
            .into_view()
        }
        Conversation::Session(_) => ().into_view(),
    };

    view! {
        {pdf_button}
        {move || if loading.get() {
            view! { <InlineLoading /> }.into_view()
        } else {
            view! {
                <div class="space-y-2">
                    {messages.get().into_iter().map(|m| {
                        let bubble = match m.sender {
                            Sender::User => "bg-indigo-600 text-white self-end",
                            Sender::Bot => "bg-gray-100 text-gray-900 self-start",
                        };
                        view! {
                            <div class="flex flex-col">
                                <div class=format!("max-w-[80%] rounded-lg px-3 py-2 text-sm {}", bubble)>
                                    {m.content}
                                </div>
                                <span class="text-xs text-gray-400 mt-1">
                                    {m.timestamp.format("%Y-%m-%d %H:%M").to_string()}
                                </span>
                            </div>
                        }
                    }).collect_view()}
                </div>
            }.into_view()
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_queries() {
        let session = Conversation::Session("s-42".into());
        assert_eq!(session.title(), "Session s-42");
        assert_eq!(
            session.query().to_query_pairs(),
            vec![("limit", "1000".to_string()), ("session_id", "s-42".to_string())]
        );

        let email = Conversation::Email("a@b.com".into());
        assert_eq!(email.query().email.as_deref(), Some("a@b.com"));
        assert_eq!(email.query().page, None);
    }
}
