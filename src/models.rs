//! Domain Records
//!
//! Transient copies of backend-owned records. Field names follow the
//! backend's JSON (Mongo `_id`, mixed camel and snake case).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant company and the chatbots it owns
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Company {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    /// Company domain
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub chatbots: Vec<Chatbot>,
}

impl Company {
    /// The company's first chatbot, the one the management table acts on
    pub fn primary_chatbot(&self) -> Option<&Chatbot> {
        self.chatbots.first()
    }

    /// Case-insensitive name search
    pub fn matches(&self, search: &str) -> bool {
        self.name.to_lowercase().contains(&search.to_lowercase())
    }
}

/// A chatbot with its token accounting
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Chatbot {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "companyId", alias = "company_id", default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub token_limit: Option<u64>,
    #[serde(default)]
    pub used_tokens: Option<u64>,
    #[serde(default)]
    pub total_messages: Option<u64>,
    #[serde(default)]
    pub unique_users: Option<u64>,
}

/// Tokens left for a chatbot this month
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenAllowance {
    Limited(u64),
    Unlimited,
}

impl std::fmt::Display for TokenAllowance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenAllowance::Limited(n) => write!(f, "{}", n),
            TokenAllowance::Unlimited => write!(f, "Unlimited"),
        }
    }
}

impl Chatbot {
    /// Remaining tokens; unlimited unless both limit and usage are known
    pub fn remaining_tokens(&self) -> TokenAllowance {
        match (self.token_limit, self.used_tokens) {
            (Some(limit), Some(used)) => TokenAllowance::Limited(limit.saturating_sub(used)),
            _ => TokenAllowance::Unlimited,
        }
    }

    /// Display form of the configured limit; zero means no limit
    pub fn token_limit_label(&self) -> String {
        match self.token_limit {
            Some(limit) if limit > 0 => limit.to_string(),
            _ => "Unlimited".to_string(),
        }
    }

    /// Case-insensitive name search used by the management lists
    pub fn matches(&self, search: &str) -> bool {
        self.name.to_lowercase().contains(&search.to_lowercase())
    }
}

/// A plan from the renewal catalogue
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Plan {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub max_users: Option<u32>,
}

impl Plan {
    /// Label used in the renewal picker
    pub fn label(&self) -> String {
        format!(
            "{} – ₹{} / {} days ({} users)",
            self.name,
            self.price,
            self.duration_days.map(|d| d.to_string()).unwrap_or_else(|| "?".into()),
            self.max_users.map(|u| u.to_string()).unwrap_or_else(|| "?".into()),
        )
    }
}

/// A chatbot's subscription.
///
/// The admin view receives the plan populated under `plan_id`; the user view
/// receives the plan fields flattened next to the dates. Accessors read
/// whichever is present.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Subscription {
    #[serde(default)]
    pub plan_id: Option<Plan>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub max_users: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days_remaining: Option<i64>,
}

/// Plan health bar colour band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanHealth {
    Healthy,
    Warning,
    Critical,
}

impl Subscription {
    pub fn plan_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.plan_id.as_ref().map(|p| p.name.as_str()))
            .filter(|n| !n.is_empty())
    }

    pub fn duration_days(&self) -> Option<u32> {
        self.duration_days
            .or_else(|| self.plan_id.as_ref().and_then(|p| p.duration_days))
    }

    pub fn max_users(&self) -> Option<u32> {
        self.max_users
            .or_else(|| self.plan_id.as_ref().and_then(|p| p.max_users))
    }

    pub fn price(&self) -> Option<f64> {
        self.price.or_else(|| self.plan_id.as_ref().map(|p| p.price))
    }

    /// Days left, as reported or derived from `end_date`
    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.days_remaining.or_else(|| {
            self.end_date
                .map(|end| (end - now).num_days().max(0))
        })
    }

    /// Fraction of the plan period still remaining, in `[0, 1]`
    pub fn remaining_ratio_at(&self, now: DateTime<Utc>) -> Option<f64> {
        let total = self.duration_days()?;
        if total == 0 {
            return None;
        }
        let left = self.days_remaining_at(now)?;
        Some((left as f64 / total as f64).clamp(0.0, 1.0))
    }

    pub fn health_at(&self, now: DateTime<Utc>) -> Option<PlanHealth> {
        self.remaining_ratio_at(now).map(|ratio| {
            if ratio < 0.2 {
                PlanHealth::Critical
            } else if ratio < 0.5 {
                PlanHealth::Warning
            } else {
                PlanHealth::Healthy
            }
        })
    }
}

/// Who wrote a message
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// One chat message
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub sender: Sender,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A platform administrator
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Admin {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Platform-wide counters for the admin overview
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct AdminStats {
    #[serde(rename = "totalChatbots", default)]
    pub total_chatbots: u64,
    #[serde(rename = "totalCompanies", default)]
    pub total_companies: u64,
    #[serde(default)]
    pub unique_users: u64,
    #[serde(rename = "totalMessages", default)]
    pub total_messages: u64,
    #[serde(rename = "monthlyTokenUsage", default)]
    pub monthly_token_usage: u64,
}

/// The signed-in end user's company
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct UserCompany {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub chatbot_id: Option<String>,
}

/// Usage counters for the end user's chatbot
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Usage {
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub unique_users: u64,
}

/// Chatbot widget configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub demo_message: String,
    #[serde(default)]
    pub demo_link: String,
    #[serde(default)]
    pub default_suggestions: Vec<String>,
    #[serde(default)]
    pub demo_keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chatbot_from_backend_json() {
        let json = r#"{
            "_id": "cb1",
            "name": "Acme Bot",
            "company_name": "Acme",
            "token_limit": 1000,
            "used_tokens": 1200,
            "total_messages": 42
        }"#;
        let bot: Chatbot = serde_json::from_str(json).unwrap();
        assert_eq!(bot.id, "cb1");
        assert_eq!(bot.remaining_tokens(), TokenAllowance::Limited(0));
        assert_eq!(bot.unique_users, None);
    }

    #[test]
    fn test_remaining_tokens_unlimited_without_usage() {
        let bot = Chatbot {
            id: "cb".into(),
            token_limit: Some(500),
            ..Default::default()
        };
        assert_eq!(bot.remaining_tokens(), TokenAllowance::Unlimited);
        assert_eq!(bot.remaining_tokens().to_string(), "Unlimited");
        assert_eq!(bot.token_limit_label(), "500");

        let bot = Chatbot {
            token_limit: Some(0),
            ..Default::default()
        };
        assert_eq!(bot.token_limit_label(), "Unlimited");
    }

    #[test]
    fn test_company_search_ignores_case() {
        let company: Company =
            serde_json::from_str(r#"{"_id": "c1", "name": "Acme Foods"}"#).unwrap();
        assert!(company.matches("acme"));
        assert!(company.matches("FOODS"));
        assert!(!company.matches("globex"));
        assert!(company.primary_chatbot().is_none());
    }

    #[test]
    fn test_subscription_nested_plan() {
        let json = r#"{
            "plan_id": {"_id": "p1", "name": "Pro", "price": 999, "duration_days": 30, "max_users": 100},
            "end_date": "2026-11-01T00:00:00Z"
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.plan_name(), Some("Pro"));
        assert_eq!(sub.duration_days(), Some(30));
        assert_eq!(sub.max_users(), Some(100));

        let now = Utc.with_ymd_and_hms(2026, 10, 27, 0, 0, 0).unwrap();
        assert_eq!(sub.days_remaining_at(now), Some(5));
        assert_eq!(sub.health_at(now), Some(PlanHealth::Critical));
    }

    #[test]
    fn test_subscription_flat_plan_health() {
        let sub = Subscription {
            name: Some("Starter".into()),
            duration_days: Some(30),
            days_remaining: Some(12),
            ..Default::default()
        };
        let now = Utc::now();
        assert_eq!(sub.health_at(now), Some(PlanHealth::Warning));

        let sub = Subscription {
            days_remaining: Some(20),
            ..sub
        };
        assert_eq!(sub.health_at(now), Some(PlanHealth::Healthy));
    }

    #[test]
    fn test_stats_field_names() {
        let json = r#"{"totalChatbots": 3, "totalCompanies": 2, "unique_users": 10,
                       "totalMessages": 77, "monthlyTokenUsage": 12345}"#;
        let stats: AdminStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_chatbots, 3);
        assert_eq!(stats.monthly_token_usage, 12345);
    }

    #[test]
    fn test_message_sender() {
        let json = r#"{"sender": "bot", "content": "hi", "timestamp": "2026-10-01T10:00:00Z",
                       "session_id": "s1"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.email, None);
    }
}
