//! Previous / next paging controls

use leptos::*;
use troika::PageInfo;

#[component]
pub fn Paginator(
    #[prop(into)]
    info: Signal<PageInfo>,
    #[prop(into)]
    on_page: Callback<u32>,
) -> impl IntoView {
    let prev = move |_| {
        if let Some(page) = info.get_untracked().prev() {
            on_page.call(page);
        }
    };
    let next = move |_| {
        if let Some(page) = info.get_untracked().next() {
            on_page.call(page);
        }
    };

    view! {
        <div class="flex items-center justify-between mt-4">
            <button
                on:click=prev
                disabled=move || info.get().prev_disabled()
                class="px-4 py-2 bg-gray-200 hover:bg-gray-300 disabled:opacity-50 rounded-lg"
            >
                "Previous"
            </button>
            <span class="text-sm text-gray-600">{move || info.get().label()}</span>
            <button
                on:click=next
                disabled=move || info.get().next_disabled()
                class="px-4 py-2 bg-gray-200 hover:bg-gray-300 disabled:opacity-50 rounded-lg"
            >
                "Next"
            </button>
        </div>
    }
}
