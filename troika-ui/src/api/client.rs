//! HTTP API Client
//!
//! Functions for communicating with the Troika REST API. Every request
//! carries the bearer token of the session currently in `localStorage`.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use troika::api::dto::*;
use troika::{
    Admin, AdminStats, Chatbot, ClientConfig, ClientError, ClientResult, Company, Message,
    MessageQuery, Plan, Subscription, Usage, UserCompany,
};

use crate::state::global::session_store;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://api.0804.in/api";

const API_BASE_KEY: &str = "troika_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(API_BASE_KEY).ok().flatten())
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

fn url(path: &str) -> String {
    format!("{}{}", get_api_base(), path)
}

fn segment(value: &str) -> String {
    js_sys::encode_uri_component(value).into()
}

fn authorized(builder: RequestBuilder) -> RequestBuilder {
    match session_store().token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

fn transport(e: gloo_net::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

async fn check(response: Response) -> ClientResult<Response> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let message = response.text().await.ok().and_then(|body| ErrorBody::parse(&body));
    web_sys::console::warn_1(
        &format!("{} {} -> {}", response.url(), status, message.as_deref().unwrap_or("")).into(),
    );
    Err(ClientError::from_status(status, message))
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

async fn get<T: DeserializeOwned>(path: &str) -> ClientResult<T> {
    let response = authorized(Request::get(&url(path)))
        .send()
        .await
        .map_err(transport)?;
    decode(check(response).await?).await
}

async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
    builder: RequestBuilder,
    body: &B,
) -> ClientResult<T> {
    let response = authorized(builder)
        .json(body)
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    decode(check(response).await?).await
}

async fn send_unit<B: Serialize + ?Sized>(
    builder: RequestBuilder,
    body: Option<&B>,
) -> ClientResult<()> {
    let builder = authorized(builder);
    let response = match body {
        Some(body) => builder.json(body).map_err(transport)?.send().await,
        None => builder.send().await,
    }
    .map_err(transport)?;
    check(response).await?;
    Ok(())
}

async fn get_bytes(path: &str) -> ClientResult<Vec<u8>> {
    let response = authorized(Request::get(&url(path)))
        .send()
        .await
        .map_err(transport)?;
    check(response)
        .await?
        .binary()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

// ============ Admin ============

/// Exchange credentials for an admin token
pub async fn login(email: &str, password: &str) -> ClientResult<String> {
    let body = LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    };
    let response: LoginResponse = send_json(Request::post(&url("/admin/login")), &body)
        .await
        .map_err(ClientError::into_login_failure)?;
    Ok(response.token)
}

pub async fn admin_stats() -> ClientResult<AdminStats> {
    get("/admin/stats").await
}

pub async fn fetch_admins() -> ClientResult<Vec<Admin>> {
    let response: AdminsResponse = get("/admin/all").await?;
    Ok(response.admins)
}

/// Create an administrator; a `success: false` reply is an error
pub async fn create_admin(admin: &NewAdmin) -> ClientResult<()> {
    let response: CreateAdminResponse =
        send_json(Request::post(&url("/admin/create")), admin).await?;
    if response.success {
        Ok(())
    } else {
        Err(ClientError::Api {
            status: 200,
            message: response.error,
        })
    }
}

// ============ Companies ============

pub async fn fetch_companies() -> ClientResult<Vec<Company>> {
    let response: CompaniesResponse = get("/company/all").await?;
    Ok(response.companies)
}

pub async fn create_company(company: &NewCompany) -> ClientResult<()> {
    send_unit(Request::post(&url("/company/create")), Some(company)).await
}

pub async fn delete_company(company_id: &str) -> ClientResult<()> {
    let path = format!("/company/delete/{}", segment(company_id));
    send_unit::<()>(Request::delete(&url(&path)), None).await
}

// ============ Chatbots ============

pub async fn fetch_chatbots() -> ClientResult<Vec<Chatbot>> {
    let response: ChatbotsResponse = get("/chatbot/all").await?;
    Ok(response.chatbots)
}

pub async fn create_chatbot(chatbot: &NewChatbot) -> ClientResult<()> {
    send_unit(Request::post(&url("/chatbot/create")), Some(chatbot)).await
}

pub async fn delete_chatbot(chatbot_id: &str) -> ClientResult<()> {
    let path = format!("/chatbot/delete/{}", segment(chatbot_id));
    send_unit::<()>(Request::delete(&url(&path)), None).await
}

pub async fn update_token_limit(chatbot_id: &str, token_limit: u64) -> ClientResult<()> {
    let path = format!("/chatbot/update-token-limit/{}", segment(chatbot_id));
    send_unit(Request::put(&url(&path)), Some(&TokenLimitUpdate { token_limit })).await
}

pub async fn fetch_subscription(chatbot_id: &str) -> ClientResult<Option<Subscription>> {
    let path = format!("/chatbot/{}/subscription", segment(chatbot_id));
    let value: serde_json::Value = get(&path).await?;
    subscription_from_body(value)
}

pub async fn renew_plan(chatbot_id: &str, request: &RenewRequest) -> ClientResult<()> {
    let path = format!("/chatbot/{}/renew", segment(chatbot_id));
    send_unit(Request::post(&url(&path)), Some(request)).await
}

pub async fn fetch_plans() -> ClientResult<Vec<Plan>> {
    let response: PlansResponse = get("/plans").await?;
    Ok(response.plans)
}

pub async fn fetch_client_config(chatbot_id: &str) -> ClientResult<ClientConfig> {
    let path = format!("/chatbot/{}/config", segment(chatbot_id));
    let response: ConfigResponse = get(&path).await?;
    Ok(response.config)
}

pub async fn update_client_config(chatbot_id: &str, config: &ClientConfig) -> ClientResult<()> {
    let path = format!("/chatbot/{}/config", segment(chatbot_id));
    send_unit(Request::put(&url(&path)), Some(config)).await
}

pub async fn fetch_chatbot_messages(chatbot_id: &str) -> ClientResult<Vec<Message>> {
    let path = format!("/chatbot/messages/{}", segment(chatbot_id));
    let page: MessagePage = get(&path).await?;
    Ok(page.messages)
}

/// Upload one context file; returns the number of chunks stored
pub async fn upload_context(file: &web_sys::File, chatbot_id: &str) -> ClientResult<u64> {
    let form = web_sys::FormData::new().map_err(|e| ClientError::Storage(format!("{:?}", e)))?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .and_then(|_| form.append_with_str("chatbotId", chatbot_id))
        .map_err(|e| ClientError::Storage(format!("{:?}", e)))?;

    let response = authorized(Request::post(&url("/context/upload-file")))
        .body(form)
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    let response: UploadResponse = decode(check(response).await?).await?;
    Ok(response.chunks_stored)
}

pub async fn download_chatbot_report(chatbot_id: &str) -> ClientResult<Vec<u8>> {
    let path = format!("/report/download/{}", segment(chatbot_id));
    get_bytes(&path).await
}

// ============ User ============

pub async fn fetch_user_company() -> ClientResult<UserCompany> {
    get("/user/company").await
}

pub async fn fetch_user_usage() -> ClientResult<Usage> {
    get("/user/usage").await
}

pub async fn fetch_sessions() -> ClientResult<Vec<String>> {
    let response: SessionsResponse = get("/user/sessions").await?;
    Ok(response.sessions)
}

/// One page of message history, or a whole conversation
pub async fn fetch_messages(query: &MessageQuery) -> ClientResult<MessagePage> {
    let response = authorized(Request::get(&url("/user/messages")))
        .query(query.to_query_pairs())
        .send()
        .await
        .map_err(transport)?;
    decode(check(response).await?).await
}

pub async fn fetch_unique_emails() -> ClientResult<Vec<String>> {
    let response: EmailsResponse = get("/user/messages/unique-emails").await?;
    Ok(response.emails)
}

pub async fn download_email_pdf(email: &str) -> ClientResult<Vec<u8>> {
    let path = format!("/user/messages/{}/pdf", segment(email));
    get_bytes(&path).await
}

pub async fn download_user_report() -> ClientResult<Vec<u8>> {
    get_bytes("/user/report/download").await
}
