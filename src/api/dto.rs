//! Data Transfer Objects
//!
//! Request bodies and response envelopes of the platform's REST API.
//! Records themselves live in [`crate::models`]; this module only wraps them.

use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use crate::models::{Admin, Chatbot, ClientConfig, Company, Message, Plan, Subscription};

// ============================================
// AUTH DTOs
// ============================================

/// `POST /admin/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token
    pub token: String,
}

// ============================================
// ADMIN DTOs
// ============================================

/// `POST /admin/create`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub admins: Vec<Admin>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminResponse {
    #[serde(default)]
    pub success: bool,
    /// Reason when `success` is false
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================
// COMPANY DTOs
// ============================================

/// `POST /company/create`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewCompany {
    pub name: String,
    /// Company domain
    pub url: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CompaniesResponse {
    #[serde(default)]
    pub companies: Vec<Company>,
}

// ============================================
// CHATBOT DTOs
// ============================================

/// `POST /chatbot/create`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewChatbot {
    #[serde(rename = "companyId")]
    pub company_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatbotsResponse {
    #[serde(default)]
    pub chatbots: Vec<Chatbot>,
}

/// `PUT /chatbot/update-token-limit/:id`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TokenLimitUpdate {
    pub token_limit: u64,
}

/// `POST /chatbot/:id/renew`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenewRequest {
    pub plan_id: String,
    pub months: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub config: ClientConfig,
}

#[derive(Debug, Deserialize)]
pub struct PlansResponse {
    #[serde(default)]
    pub plans: Vec<Plan>,
}

// ============================================
// MESSAGE DTOs
// ============================================

/// One page of message history
#[derive(Debug, Default, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Absent for unpaginated fetches
    #[serde(rename = "totalPages", default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailsResponse {
    #[serde(default)]
    pub emails: Vec<String>,
}

// ============================================
// CONTEXT DTOs
// ============================================

/// `POST /context/upload-file`
#[derive(Debug, Deserialize, Serialize)]
pub struct UploadResponse {
    #[serde(rename = "chunksStored", default)]
    pub chunks_stored: u64,
}

/// Read a `GET /chatbot/:id/subscription` body.
///
/// Admin sessions receive `{subscription}`; user sessions receive the
/// subscription object bare and it only counts if it has an end date.
pub fn subscription_from_body(value: serde_json::Value) -> ClientResult<Option<Subscription>> {
    let subscription = match value {
        serde_json::Value::Object(mut map) if map.contains_key("subscription") => {
            match map.remove("subscription") {
                Some(serde_json::Value::Null) | None => None,
                Some(inner) => Some(serde_json::from_value::<Subscription>(inner)?),
            }
        }
        serde_json::Value::Null => None,
        bare => {
            let sub: Subscription = serde_json::from_value(bare)?;
            sub.end_date.is_some().then_some(sub)
        }
    };
    Ok(subscription)
}

// ============================================
// ERROR DTOs
// ============================================

/// Error payload; the backend uses either field
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// `message`, falling back to `error`, ignoring blanks
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|m| !m.trim().is_empty()))
    }

    /// Best-effort extraction from a raw body
    pub fn parse(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_envelopes() {
        let nested = serde_json::json!({"subscription": {"plan_id": {"name": "Pro", "price": 999.0}}});
        let sub = subscription_from_body(nested).unwrap().unwrap();
        assert_eq!(sub.plan_name(), Some("Pro"));

        assert_eq!(subscription_from_body(serde_json::json!({"subscription": null})).unwrap(), None);
        assert_eq!(subscription_from_body(serde_json::Value::Null).unwrap(), None);
        // a bare object without dates is an empty placeholder
        assert_eq!(subscription_from_body(serde_json::json!({"name": "Pro"})).unwrap(), None);

        let bare = serde_json::json!({"name": "Pro", "end_date": "2026-11-30T00:00:00Z"});
        assert!(subscription_from_body(bare).unwrap().is_some());
    }

    #[test]
    fn test_error_body_fallback() {
        assert_eq!(
            ErrorBody::parse(r#"{"message": "Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            ErrorBody::parse(r#"{"message": "", "error": "Chatbot not found"}"#).as_deref(),
            Some("Chatbot not found")
        );
        assert_eq!(ErrorBody::parse("<html>502</html>"), None);
    }

    #[test]
    fn test_message_page_without_total() {
        let page: MessagePage = serde_json::from_str(r#"{"messages": []}"#).unwrap();
        assert!(page.messages.is_empty());
        assert_eq!(page.total_pages, None);
    }

    #[test]
    fn test_request_field_names() {
        let body = serde_json::to_value(NewChatbot {
            company_id: "c1".into(),
            name: "Acme Bot".into(),
        })
        .unwrap();
        assert_eq!(body["companyId"], "c1");

        let body = serde_json::to_value(TokenLimitUpdate { token_limit: 5000 }).unwrap();
        assert_eq!(body, serde_json::json!({"token_limit": 5000}));
    }
}
