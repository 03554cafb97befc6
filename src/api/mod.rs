//! Troika REST API
//!
//! Wire types for the platform backend and, with the `native` feature, the
//! HTTP client that talks to it.
//!
//! # Endpoints
//!
//! ## Admin
//! - `POST /admin/login` - Exchange credentials for a bearer token
//! - `GET /admin/stats` - Platform counters
//! - `GET /admin/all`, `POST /admin/create` - Administrators
//!
//! ## Companies and chatbots
//! - `GET /company/all`, `POST /company/create`, `DELETE /company/delete/:id`
//! - `GET /chatbot/all`, `POST /chatbot/create`, `DELETE /chatbot/delete/:id`
//! - `PUT /chatbot/update-token-limit/:id`
//! - `GET /chatbot/:id/subscription`, `POST /chatbot/:id/renew`, `GET /plans`
//! - `GET /chatbot/:id/config`, `PUT /chatbot/:id/config`
//! - `GET /chatbot/messages/:chatbotId`
//! - `POST /context/upload-file` - Multipart context ingestion
//! - `GET /report/download/:chatbotId` - PDF report
//!
//! ## User
//! - `GET /user/company`, `GET /user/usage`
//! - `GET /user/sessions`, `GET /user/messages`, `GET /user/messages/unique-emails`
//! - `GET /user/messages/:email/pdf`, `GET /user/report/download`

pub mod dto;

#[cfg(feature = "native")]
pub mod client;

#[cfg(feature = "native")]
pub use client::{ApiClient, SharedSession, DEFAULT_BASE_URL};

/// In-process backend for client tests
#[cfg(all(test, feature = "native"))]
pub(crate) mod mock {
    use axum::Router;

    /// Serve `router` on an ephemeral port and return its base URL
    pub async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
