//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod loading;
pub mod modal;
pub mod paginator;
pub mod protected;
pub mod sidebar;
pub mod stat_card;
pub mod toast;
pub mod upload_button;

pub use loading::{InlineLoading, ListSkeleton, Loading};
pub use modal::Modal;
pub use paginator::Paginator;
pub use protected::DashboardLayout;
pub use sidebar::Sidebar;
pub use stat_card::StatCard;
pub use toast::Toast;
pub use upload_button::UploadButton;
