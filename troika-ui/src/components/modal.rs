//! Modal dialog

use leptos::*;

/// Centered dialog over a dimmed backdrop; clicking the backdrop closes it
#[component]
pub fn Modal(
    #[prop(into)]
    title: MaybeSignal<String>,
    #[prop(into)]
    on_close: Callback<()>,
    children: Children,
) -> impl IntoView {
    view! {
        <div
            class="fixed inset-0 z-40 bg-black/50 flex items-center justify-center"
            on:click=move |_| on_close.call(())
        >
            <div
                class="bg-white rounded-xl shadow-xl w-full max-w-2xl max-h-[80vh] flex flex-col"
                on:click=|ev| ev.stop_propagation()
            >
                <div class="flex items-center justify-between px-6 py-4 border-b">
                    <h3 class="text-lg font-semibold">{move || title.get()}</h3>
                    <button
                        class="text-gray-500 hover:text-gray-800"
                        on:click=move |_| on_close.call(())
                    >
                        "✕"
                    </button>
                </div>
                <div class="p-6 overflow-y-auto">
                    {children()}
                </div>
            </div>
        </div>
    }
}
