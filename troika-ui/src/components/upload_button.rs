//! Context Upload Button
//!
//! One file at a time per button: the input is disabled from the moment a
//! file is picked until the backend answers.

use leptos::*;
use wasm_bindgen::JsCast;

use troika::forms::{is_accepted_upload, ACCEPTED_EXTENSIONS};
use troika::{BusyFlag, ClientError, Notification};

use crate::api;
use crate::state::global::use_global_state;

#[component]
pub fn UploadButton(
    #[prop(into)]
    chatbot_id: String,
) -> impl IntoView {
    let state = use_global_state();
    let busy = BusyFlag::new();
    let (uploading, set_uploading) = create_signal(false);
    let chatbot_id = store_value(chatbot_id);

    let accept = ACCEPTED_EXTENSIONS
        .map(|e| format!(".{}", e))
        .join(",");

    let on_change = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        // let the same file be picked again after this upload
        input.set_value("");

        if !is_accepted_upload(&file.name()) {
            let err = ClientError::Validation(format!(
                "Unsupported file type. Accepted: {}",
                ACCEPTED_EXTENSIONS.map(|e| format!(".{}", e)).join(", ")
            ));
            state.notify(Notification::upload_outcome(&Err(err)));
            return;
        }

        let Some(guard) = busy.try_acquire() else {
            state.show_error("An upload is already in progress.");
            return;
        };
        set_uploading.set(true);

        spawn_local(async move {
            let result = api::upload_context(&file, &chatbot_id.get_value()).await;
            if let Err(e) = &result {
                web_sys::console::error_1(&format!("Upload failed: {}", e).into());
                if e.requires_login() {
                    state.sign_out();
                }
            }
            state.notify(Notification::upload_outcome(&result));
            drop(guard);
            set_uploading.set(false);
        });
    };

    view! {
        <label class=move || format!(
            "inline-flex items-center px-3 py-1 bg-indigo-600 hover:bg-indigo-700 text-white \
             rounded-lg text-sm cursor-pointer transition-colors{}",
            if uploading.get() { " opacity-50" } else { "" }
        )>
            <input
                type="file"
                accept=accept
                class="hidden"
                on:change=on_change
                disabled=move || uploading.get()
            />
            {move || if uploading.get() { "Uploading..." } else { "Upload Context" }}
        </label>
    }
}
