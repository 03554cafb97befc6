//! Pages
//!
//! Top-level page components for each route.

pub mod add_admin;
pub mod chatbots;
pub mod companies;
pub mod login;
pub mod message_history;
pub mod overview;
pub mod user_dashboard;

pub use add_admin::AddAdmin;
pub use chatbots::Chatbots;
pub use companies::Companies;
pub use login::Login;
pub use message_history::MessageHistory;
pub use overview::Overview;
pub use user_dashboard::UserDashboard;
