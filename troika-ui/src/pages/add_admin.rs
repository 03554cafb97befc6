//! Add Admin Page
//!
//! Administrator list and creation form.

use leptos::*;

use troika::forms::NewAdminForm;
use troika::Admin;

use crate::api;
use crate::components::ListSkeleton;
use crate::state::global::use_global_state;

#[component]
pub fn AddAdmin() -> impl IntoView {
    let state = use_global_state();

    let admins = create_rw_signal(Vec::<Admin>::new());
    let (loading, set_loading) = create_signal(true);
    let form = create_rw_signal(NewAdminForm::default());
    let (submitting, set_submitting) = create_signal(false);

    let reload = move || {
        set_loading.set(true);
        spawn_local(async move {
            match api::fetch_admins().await {
                Ok(list) => admins.set(list),
                Err(e) => state.report(&e, "Failed to fetch admins"),
            }
            set_loading.set(false);
        });
    };
    reload();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let admin = match form.with_untracked(NewAdminForm::validate) {
            Ok(admin) => admin,
            Err(e) => return state.show_error(&e.to_string()),
        };
        set_submitting.set(true);
        spawn_local(async move {
            match api::create_admin(&admin).await {
                Ok(()) => {
                    state.show_success("Admin created");
                    form.set(NewAdminForm::default());
                    reload();
                }
                Err(e) => state.report(&e, "Failed to create admin"),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Add Admin"</h1>

            <form on:submit=on_submit class="bg-white rounded-xl shadow p-6 grid grid-cols-1 md:grid-cols-2 gap-3 max-w-2xl">
                <input type="text" placeholder="Name" class="border rounded-lg px-3 py-2"
                    prop:value=move || form.with(|f| f.name.clone())
                    on:input=move |ev| form.update(|f| f.name = event_target_value(&ev)) />
                <input type="email" placeholder="Email" class="border rounded-lg px-3 py-2"
                    prop:value=move || form.with(|f| f.email.clone())
                    on:input=move |ev| form.update(|f| f.email = event_target_value(&ev)) />
                <input type="password" placeholder="Password" class="border rounded-lg px-3 py-2"
                    prop:value=move || form.with(|f| f.password.clone())
                    on:input=move |ev| form.update(|f| f.password = event_target_value(&ev)) />
                <input type="password" placeholder="Confirm password" class="border rounded-lg px-3 py-2"
                    prop:value=move || form.with(|f| f.confirm_password.clone())
                    on:input=move |ev| form.update(|f| f.confirm_password = event_target_value(&ev)) />
                <button
                    type="submit"
                    disabled=move || submitting.get()
                    class="md:col-span-2 px-4 py-2 bg-indigo-600 hover:bg-indigo-700 disabled:bg-gray-400
                           text-white rounded-lg font-medium"
                >
                    {move || if submitting.get() { "Creating..." } else { "Create Admin" }}
                </button>
            </form>

            {move || if loading.get() {
                view! { <ListSkeleton /> }.into_view()
            } else {
                view! {
                    <table class="min-w-full bg-white rounded-xl shadow text-sm">
                        <thead class="bg-gray-50 text-left">
                            <tr>
                                <th class="px-4 py-3">"Name"</th>
                                <th class="px-4 py-3">"Email"</th>
                                <th class="px-4 py-3">"Created"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {admins.get().into_iter().map(|admin| view! {
                                <tr class="border-t">
                                    <td class="px-4 py-3">{admin.name}</td>
                                    <td class="px-4 py-3">{admin.email}</td>
                                    <td class="px-4 py-3">
                                        {admin.created_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()}
                                    </td>
                                </tr>
                            }).collect_view()}
                        </tbody>
                    </table>
                }.into_view()
            }}
        </div>
    }
}
