//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;
use troika::{Role, Route as View};

use crate::components::{DashboardLayout, Toast};
use crate::pages::{
    AddAdmin, Chatbots, Companies, Login, MessageHistory, Overview, UserDashboard,
};
use crate::state::global::provide_global_state;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    provide_global_state();

    view! {
        <Router>
            <div class="min-h-screen bg-gray-100 text-gray-900">
                <Routes>
                    <Route path=View::Login.path() view=Login />
                    <Route path="/dashboard" view=|| view! { <Redirect path=View::Overview.path() /> } />

                    <Route path=View::Overview.path() view=|| view! {
                        <DashboardLayout role=Role::Admin><Overview /></DashboardLayout>
                    } />
                    <Route path=View::Companies.path() view=|| view! {
                        <DashboardLayout role=Role::Admin><Companies /></DashboardLayout>
                    } />
                    <Route path=View::Chatbots.path() view=|| view! {
                        <DashboardLayout role=Role::Admin><Chatbots /></DashboardLayout>
                    } />
                    <Route path=View::AddAdmin.path() view=|| view! {
                        <DashboardLayout role=Role::Admin><AddAdmin /></DashboardLayout>
                    } />

                    <Route path=View::UserDashboard.path() view=|| view! {
                        <DashboardLayout role=Role::User><UserDashboard /></DashboardLayout>
                    } />
                    <Route path=View::UserMessageHistory.path() view=|| view! {
                        <DashboardLayout role=Role::User><MessageHistory /></DashboardLayout>
                    } />

                    // Unknown paths go back to login
                    <Route path="/*any" view=|| view! { <Redirect path=View::Login.path() /> } />
                </Routes>

                // Toast notifications
                <Toast />
            </div>
        </Router>
    }
}
