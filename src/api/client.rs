//! Troika REST API Client
//!
//! Every request carries the bearer token of the active session and a fresh
//! `X-Request-Id`. Failures are returned as-is: there is no retry and no
//! timeout beyond the transport's own.

use std::sync::Arc;

use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::dto::*;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Admin, AdminStats, Chatbot, ClientConfig, Company, Message, Plan, Subscription, Usage,
    UserCompany,
};
use crate::pagination::MessageQuery;
use crate::session::{Role, SessionStorage, SessionStore};

/// Production backend
pub const DEFAULT_BASE_URL: &str = "https://api.0804.in/api";

/// Session store shared between the client and its callers
pub type SharedSession = Arc<SessionStore<Box<dyn SessionStorage + Send + Sync>>>;

/// REST client for the Troika backend
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SharedSession,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SharedSession) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("troika/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and map non-success statuses onto [`ClientError`]
    async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ClientResult<Response> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .header("X-Request-Id", &request_id);

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        tracing::debug!(method = %method, path = %path, request_id = %request_id, "API request");

        let response = build(request).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Transport(format!("Request timed out: {}", e))
            } else if e.is_connect() {
                ClientError::Transport(format!("Backend unreachable: {}", e))
            } else {
                ClientError::from(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), request_id = %request_id, "API response");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = ErrorBody::parse(&body);
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            request_id = %request_id,
            message = message.as_deref().unwrap_or(""),
            "API request failed"
        );
        Err(ClientError::from_status(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ClientError::from)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::decode(self.send(Method::GET, path, |r| r).await?).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        Self::decode(self.send(method, path, |r| r.json(body)).await?).await
    }

    /// Fire a request whose response body is not needed
    async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<()> {
        self.send(method, path, |r| match body {
            Some(body) => r.json(body),
            None => r,
        })
        .await?;
        Ok(())
    }

    async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>> {
        let response = self.send(Method::GET, path, |r| r).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ============================================
    // ADMIN
    // ============================================

    /// Log in as an administrator and store the admin session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .send_json(Method::POST, "/admin/login", &body)
            .await
            .map_err(ClientError::into_login_failure)?;

        if response.token.trim().is_empty() {
            return Err(ClientError::Decode("login response carried an empty token".into()));
        }

        self.session.set_session(&response.token, Role::Admin)?;
        tracing::info!(email = %body.email, "Admin logged in");
        Ok(response.token)
    }

    pub async fn admin_stats(&self) -> ClientResult<AdminStats> {
        self.get("/admin/stats").await
    }

    pub async fn admins(&self) -> ClientResult<Vec<Admin>> {
        let response: AdminsResponse = self.get("/admin/all").await?;
        Ok(response.admins)
    }

    /// Create an administrator; a `success: false` reply is an error
    pub async fn create_admin(&self, admin: &NewAdmin) -> ClientResult<()> {
        let response: CreateAdminResponse =
            self.send_json(Method::POST, "/admin/create", admin).await?;
        if response.success {
            tracing::info!(email = %admin.email, "Admin created");
            Ok(())
        } else {
            Err(ClientError::Api {
                status: 200,
                message: response.error,
            })
        }
    }

    // ============================================
    // COMPANIES
    // ============================================

    pub async fn companies(&self) -> ClientResult<Vec<Company>> {
        let response: CompaniesResponse = self.get("/company/all").await?;
        Ok(response.companies)
    }

    pub async fn create_company(&self, company: &NewCompany) -> ClientResult<()> {
        self.send_unit(Method::POST, "/company/create", Some(company)).await?;
        tracing::info!(name = %company.name, "Company created");
        Ok(())
    }

    /// Delete a company together with its chatbots
    pub async fn delete_company(&self, company_id: &str) -> ClientResult<()> {
        let path = format!("/company/delete/{}", segment(company_id));
        self.send_unit::<()>(Method::DELETE, &path, None).await?;
        tracing::info!(company_id = %company_id, "Company deleted");
        Ok(())
    }

    // ============================================
    // CHATBOTS
    // ============================================

    pub async fn chatbots(&self) -> ClientResult<Vec<Chatbot>> {
        let response: ChatbotsResponse = self.get("/chatbot/all").await?;
        Ok(response.chatbots)
    }

    pub async fn create_chatbot(&self, chatbot: &NewChatbot) -> ClientResult<()> {
        self.send_unit(Method::POST, "/chatbot/create", Some(chatbot)).await?;
        tracing::info!(company_id = %chatbot.company_id, name = %chatbot.name, "Chatbot created");
        Ok(())
    }

    pub async fn delete_chatbot(&self, chatbot_id: &str) -> ClientResult<()> {
        let path = format!("/chatbot/delete/{}", segment(chatbot_id));
        self.send_unit::<()>(Method::DELETE, &path, None).await?;
        tracing::info!(chatbot_id = %chatbot_id, "Chatbot deleted");
        Ok(())
    }

    pub async fn update_token_limit(&self, chatbot_id: &str, token_limit: u64) -> ClientResult<()> {
        let path = format!("/chatbot/update-token-limit/{}", segment(chatbot_id));
        self.send_unit(Method::PUT, &path, Some(&TokenLimitUpdate { token_limit }))
            .await
    }

    /// A chatbot's subscription, `None` when it has none
    pub async fn subscription(&self, chatbot_id: &str) -> ClientResult<Option<Subscription>> {
        let path = format!("/chatbot/{}/subscription", segment(chatbot_id));
        let value: serde_json::Value = self.get(&path).await?;
        subscription_from_body(value)
    }

    pub async fn renew(&self, chatbot_id: &str, request: &RenewRequest) -> ClientResult<()> {
        let path = format!("/chatbot/{}/renew", segment(chatbot_id));
        self.send_unit(Method::POST, &path, Some(request)).await?;
        tracing::info!(chatbot_id = %chatbot_id, plan_id = %request.plan_id, months = request.months, "Plan renewed");
        Ok(())
    }

    pub async fn plans(&self) -> ClientResult<Vec<Plan>> {
        let response: PlansResponse = self.get("/plans").await?;
        Ok(response.plans)
    }

    pub async fn client_config(&self, chatbot_id: &str) -> ClientResult<ClientConfig> {
        let path = format!("/chatbot/{}/config", segment(chatbot_id));
        let response: ConfigResponse = self.get(&path).await?;
        Ok(response.config)
    }

    pub async fn update_client_config(&self, chatbot_id: &str, config: &ClientConfig) -> ClientResult<()> {
        let path = format!("/chatbot/{}/config", segment(chatbot_id));
        self.send_unit(Method::PUT, &path, Some(config)).await
    }

    /// Full message history of one chatbot
    pub async fn chatbot_messages(&self, chatbot_id: &str) -> ClientResult<Vec<Message>> {
        let path = format!("/chatbot/messages/{}", segment(chatbot_id));
        let page: MessagePage = self.get(&path).await?;
        Ok(page.messages)
    }

    /// Upload one context file; returns the number of chunks stored
    pub async fn upload_context(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        chatbot_id: &str,
    ) -> ClientResult<u64> {
        let size = bytes.len();
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("chatbotId", chatbot_id.to_string());

        let response = self
            .send(Method::POST, "/context/upload-file", |r| r.multipart(form))
            .await?;
        let response: UploadResponse = Self::decode(response).await?;

        tracing::info!(
            chatbot_id = %chatbot_id,
            file = %file_name,
            bytes = size,
            chunks = response.chunks_stored,
            "Context uploaded"
        );
        Ok(response.chunks_stored)
    }

    /// PDF report for one chatbot
    pub async fn chatbot_report(&self, chatbot_id: &str) -> ClientResult<Vec<u8>> {
        let path = format!("/report/download/{}", segment(chatbot_id));
        self.get_bytes(&path).await
    }

    // ============================================
    // USER
    // ============================================

    pub async fn user_company(&self) -> ClientResult<UserCompany> {
        self.get("/user/company").await
    }

    pub async fn user_usage(&self) -> ClientResult<Usage> {
        self.get("/user/usage").await
    }

    pub async fn user_sessions(&self) -> ClientResult<Vec<String>> {
        let response: SessionsResponse = self.get("/user/sessions").await?;
        Ok(response.sessions)
    }

    /// One page (or a whole conversation) of the user's message history
    pub async fn user_messages(&self, query: &MessageQuery) -> ClientResult<MessagePage> {
        let pairs = query.to_query_pairs();
        let response = self
            .send(Method::GET, "/user/messages", |r| r.query(&pairs))
            .await?;
        Self::decode(response).await
    }

    pub async fn unique_emails(&self) -> ClientResult<Vec<String>> {
        let response: EmailsResponse = self.get("/user/messages/unique-emails").await?;
        Ok(response.emails)
    }

    /// Conversation PDF for one email address
    pub async fn email_pdf(&self, email: &str) -> ClientResult<Vec<u8>> {
        let path = format!("/user/messages/{}/pdf", segment(email));
        self.get_bytes(&path).await
    }

    pub async fn user_report(&self) -> ClientResult<Vec<u8>> {
        self.get_bytes("/user/report/download").await
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;
    use crate::session::MemoryStorage;
    use axum::extract::{Multipart, Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn session() -> SharedSession {
        Arc::new(SessionStore::boxed(MemoryStorage::default()))
    }

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }

    async fn client(router: Router) -> ApiClient {
        let base = mock::serve(router).await;
        ApiClient::new(base, session()).unwrap()
    }

    #[tokio::test]
    async fn test_login_stores_admin_session() {
        let router = Router::new().route(
            "/admin/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "admin@troika.ai");
                Json(json!({"token": "abc"}))
            }),
        );
        let client = client(router).await;

        let token = client.login("admin@troika.ai", "x").await.unwrap();
        assert_eq!(token, "abc");
        assert_eq!(client.session().token().as_deref(), Some("abc"));
        assert!(client.session().is_admin());

        let session = client.session().session();
        assert_eq!(
            crate::routes::navigate("/dashboard", session.as_ref()),
            crate::routes::Navigation::Redirect(crate::routes::Route::Overview)
        );
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let router = Router::new().route(
            "/admin/stats",
            get(|headers: HeaderMap| async move {
                match bearer(&headers).as_deref() {
                    Some("abc") => Ok(Json(json!({"totalChatbots": 4, "totalCompanies": 2}))),
                    _ => Err(StatusCode::UNAUTHORIZED),
                }
            }),
        );
        let client = client(router).await;

        let err = client.admin_stats().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized { status: 401, .. }));
        assert!(err.requires_login());

        client.session().set_session("abc", Role::Admin).unwrap();
        let stats = client.admin_stats().await.unwrap();
        assert_eq!(stats.total_chatbots, 4);
    }

    #[tokio::test]
    async fn test_backend_message_surfaces() {
        let router = Router::new()
            .route(
                "/company/create",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"message": "Company already exists"})),
                    )
                }),
            )
            .route(
                "/company/delete/:id",
                delete(|| async {
                    (StatusCode::NOT_FOUND, Json(json!({"error": "Company not found"})))
                }),
            );
        let client = client(router).await;

        let company = NewCompany {
            name: "Acme".into(),
            url: "acme.com".into(),
            email: "ops@acme.com".into(),
            password: "pw".into(),
        };
        let err = client.create_company(&company).await.unwrap_err();
        assert_eq!(err.user_message("Failed to add company."), "Company already exists");

        let err = client.delete_company("c1").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
        assert_eq!(err.user_message("Failed to delete company."), "Company not found");
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_session() {
        let router = Router::new().route(
            "/admin/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"message": "Invalid credentials"})),
                )
            }),
        );
        let client = client(router).await;
        client.session().set_session("u-token", Role::User).unwrap();

        let err = client.login("admin@troika.ai", "wrong").await.unwrap_err();
        assert_eq!(err.user_message("Login failed. Please try again."), "Invalid credentials");
        assert!(!err.requires_login());
        assert_eq!(client.session().token().as_deref(), Some("u-token"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = ApiClient::new("http://127.0.0.1:9", session()).unwrap();
        let err = client.companies().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_user_messages_query() {
        let router = Router::new().route(
            "/user/messages",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("page").map(String::as_str), Some("1"));
                assert_eq!(params.get("limit").map(String::as_str), Some("10"));
                assert_eq!(params.get("session_id").map(String::as_str), Some("a@b.com"));
                assert!(!params.contains_key("email"));
                Json(json!({
                    "messages": [
                        {"sender": "user", "content": "hi", "timestamp": "2026-10-01T10:00:00Z"}
                    ],
                    "totalPages": 3
                }))
            }),
        );
        let client = client(router).await;

        let query = MessageQuery {
            page: Some(1),
            limit: 10,
            email: None,
            session_id: Some("a@b.com".into()),
        };
        let page = client.user_messages(&query).await.unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.total_pages, Some(3));
    }

    #[tokio::test]
    async fn test_subscription_envelopes() {
        let router = Router::new().route(
            "/chatbot/:id/subscription",
            get(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "wrapped" => json!({"subscription": {"plan_id": {"name": "Pro"}}}),
                    "none" => json!({"subscription": null}),
                    "bare" => json!({"name": "Starter", "end_date": "2026-11-01T00:00:00Z"}),
                    _ => json!({"name": "Starter"}),
                }
                .to_string()
            }),
        );
        let client = client(router).await;

        let sub = client.subscription("wrapped").await.unwrap().unwrap();
        assert_eq!(sub.plan_name(), Some("Pro"));
        assert!(client.subscription("none").await.unwrap().is_none());
        assert!(client.subscription("bare").await.unwrap().is_some());
        assert!(client.subscription("undated").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_admin_unsuccessful_reply() {
        let router = Router::new().route(
            "/admin/create",
            post(|| async { Json(json!({"success": false, "error": "Email already in use"})) }),
        );
        let client = client(router).await;

        let admin = NewAdmin {
            name: "A".into(),
            email: "a@troika.ai".into(),
            password: "pw".into(),
        };
        let err = client.create_admin(&admin).await.unwrap_err();
        assert_eq!(err.user_message("Failed to create admin."), "Email already in use");
    }

    #[tokio::test]
    async fn test_upload_multipart_fields() {
        let router = Router::new().route(
            "/context/upload-file",
            post(|mut form: Multipart| async move {
                let mut fields = HashMap::new();
                while let Some(field) = form.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    let file_name = field.file_name().map(str::to_string);
                    let text = field.text().await.unwrap();
                    fields.insert(name, (file_name, text));
                }
                assert_eq!(fields["chatbotId"].1, "cb1");
                assert_eq!(fields["file"].0.as_deref(), Some("faq.txt"));
                assert_eq!(fields["file"].1, "Q: hours?\nA: 9-5");
                Json(json!({"chunksStored": 5}))
            }),
        );
        let client = client(router).await;

        let chunks = client
            .upload_context("faq.txt", b"Q: hours?\nA: 9-5".to_vec(), "cb1")
            .await
            .unwrap();
        assert_eq!(chunks, 5);
    }

    #[tokio::test]
    async fn test_report_bytes() {
        let router = Router::new().route(
            "/report/download/:id",
            get(|Path(id): Path<String>| async move { format!("%PDF-{}", id) }),
        );
        let client = client(router).await;

        let bytes = client.chatbot_report("cb1").await.unwrap();
        assert_eq!(bytes, b"%PDF-cb1");
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("brochure.PDF"), "application/pdf");
        assert_eq!(mime_for("notes"), "application/octet-stream");
    }
}
