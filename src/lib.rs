//! # Troika
//!
//! Client shell for the Troika chatbot management platform: session storage,
//! role-gated navigation, and debounced fetching of paginated message history
//! over the platform's REST API.
//!
//! ## Modules
//!
//! - [`session`]: persisted session keys (admin and user pairs)
//! - [`guard`] and [`routes`]: route table and role-gated navigation
//! - [`pagination`] and [`sequence`]: filter/page state and request ordering
//! - [`api`]: wire types and, with the `native` feature, the HTTP client
//! - [`feed`] and [`upload`]: debounced message feed and context upload
//!   (`native` only)
//!
//! The pure modules build without the `native` feature so that the browser
//! dashboard (`troika-ui`) can share them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use troika::api::ApiClient;
//! use troika::session::{FileStorage, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = FileStorage::open(FileStorage::default_path())?;
//!     let session = Arc::new(SessionStore::boxed(storage));
//!     let client = ApiClient::new("https://api.0804.in/api", session)?;
//!
//!     client.login("admin@troika.ai", "secret").await?;
//!     let stats = client.admin_stats().await?;
//!     println!("{} chatbots", stats.total_chatbots);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod busy;
pub mod error;
pub mod export;
pub mod forms;
pub mod guard;
pub mod models;
pub mod notify;
pub mod pagination;
pub mod routes;
pub mod sequence;
pub mod session;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod feed;
#[cfg(feature = "native")]
pub mod upload;

pub use busy::{BusyFlag, BusyGuard};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use guard::{authorize, protect, Access, DenyReason, Guarded};
pub use models::{
    Admin, AdminStats, Chatbot, ClientConfig, Company, Message, Plan, PlanHealth, Sender,
    Subscription, TokenAllowance, Usage, UserCompany,
};
pub use notify::{Level, Notification, ToastSlots};
pub use pagination::{
    FilterKind, FilterState, MessageQuery, PageInfo, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE,
};
pub use routes::{navigate, Navigation, Route};
pub use sequence::{RequestSequencer, Ticket};
pub use session::{MemoryStorage, Role, Session, SessionStorage, SessionStore};

#[cfg(feature = "native")]
pub use api::{ApiClient, SharedSession};
#[cfg(feature = "native")]
pub use config::{Config, ConfigError, LoggingConfig};
#[cfg(feature = "native")]
pub use feed::{FeedConfig, FeedSnapshot, MessageFeed, MessageSource};
#[cfg(feature = "native")]
pub use session::FileStorage;
#[cfg(feature = "native")]
pub use upload::{ContextUploader, UploadReport};
