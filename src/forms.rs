//! Form Validation
//!
//! Input checks run before anything is dispatched. Each validator returns the
//! request body ready to send, or a [`ClientError::Validation`] carrying the
//! text to show.

use crate::api::dto::{NewAdmin, NewChatbot, NewCompany, RenewRequest};
use crate::error::{ClientError, ClientResult};
use crate::models::{ClientConfig, Company, Plan};

/// File extensions the context ingester understands
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["txt", "pdf", "docx"];

/// Plan length assumed when a plan carries no duration
pub const DEFAULT_PLAN_DAYS: u32 = 30;

fn invalid(message: &str) -> ClientError {
    ClientError::Validation(message.to_string())
}

/// Parse the token-limit input; empty or non-numeric input is rejected
pub fn parse_token_limit(input: &str) -> ClientResult<u64> {
    let input = input.trim();
    if input.is_empty() {
        return Err(invalid("Token limit is required."));
    }
    input
        .parse::<u64>()
        .map_err(|_| invalid("Token limit must be a whole number."))
}

/// Add-admin form state
#[derive(Clone, Debug, Default)]
pub struct NewAdminForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl NewAdminForm {
    pub fn validate(&self) -> ClientResult<NewAdmin> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() || self.password.is_empty() || self.confirm_password.is_empty() {
            return Err(invalid("All fields are required."));
        }
        if self.password != self.confirm_password {
            return Err(invalid("Passwords do not match."));
        }
        Ok(NewAdmin {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Add-company form state
#[derive(Clone, Debug, Default)]
pub struct NewCompanyForm {
    pub name: String,
    pub url: String,
    pub email: String,
    pub password: String,
}

impl NewCompanyForm {
    pub fn validate(&self) -> ClientResult<NewCompany> {
        let name = self.name.trim();
        let url = self.url.trim();
        let email = self.email.trim();
        if name.is_empty() || url.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(invalid("All fields are required."));
        }
        if !email.contains('@') {
            return Err(invalid("Please enter a valid email."));
        }
        Ok(NewCompany {
            name: name.to_string(),
            url: url.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Default name suggested for a company's new chatbot
pub fn default_chatbot_name(company_name: &str) -> String {
    format!("{} Bot", company_name.trim())
}

/// Chatbot creation body; `None` input takes the default name
pub fn new_chatbot(company: &Company, name: Option<&str>) -> ClientResult<NewChatbot> {
    let name = match name {
        Some(name) => name.trim().to_string(),
        None => default_chatbot_name(&company.name),
    };
    if name.trim().is_empty() {
        return Err(invalid("Chatbot name is required."));
    }
    Ok(NewChatbot {
        company_id: company.id.clone(),
        name,
    })
}

/// Split comma-separated list input, trimming entries and dropping blanks
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Client-config editor state, lists held as comma-separated text
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientConfigForm {
    pub demo_message: String,
    pub demo_link: String,
    pub default_suggestions: String,
    pub demo_keywords: String,
}

impl From<&ClientConfig> for ClientConfigForm {
    fn from(config: &ClientConfig) -> Self {
        Self {
            demo_message: config.demo_message.clone(),
            demo_link: config.demo_link.clone(),
            default_suggestions: config.default_suggestions.join(", "),
            demo_keywords: config.demo_keywords.join(", "),
        }
    }
}

impl ClientConfigForm {
    pub fn to_config(&self) -> ClientConfig {
        ClientConfig {
            demo_message: self.demo_message.clone(),
            demo_link: self.demo_link.trim().to_string(),
            default_suggestions: split_list(&self.default_suggestions),
            demo_keywords: split_list(&self.demo_keywords),
        }
    }
}

/// Months purchased by renewing with `plan`
pub fn renewal_months(plan: &Plan) -> u32 {
    let days = plan.duration_days.unwrap_or(DEFAULT_PLAN_DAYS).max(1);
    days.div_ceil(30)
}

/// Renewal body for the plan selected by id
pub fn renewal_request(plans: &[Plan], selected: Option<&str>) -> ClientResult<RenewRequest> {
    let selected = selected
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("Please select a plan."))?;
    let plan = plans
        .iter()
        .find(|p| p.id == selected)
        .ok_or_else(|| invalid("Please select a plan."))?;
    Ok(RenewRequest {
        plan_id: plan.id.clone(),
        months: renewal_months(plan),
    })
}

/// Whether `file_name` has an extension the ingester accepts
pub fn is_accepted_upload(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty() && ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_limit_rejects_bad_input() {
        assert_eq!(parse_token_limit(" 5000 ").unwrap(), 5000);
        for bad in ["", "   ", "abc", "12.5", "-3", "1e4"] {
            assert!(
                matches!(parse_token_limit(bad), Err(ClientError::Validation(_))),
                "{:?} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_admin_form() {
        let mut form = NewAdminForm {
            name: "Ravi".into(),
            email: "ravi@troika.ai".into(),
            password: "pw".into(),
            confirm_password: "pw".into(),
        };
        let admin = form.validate().unwrap();
        assert_eq!(admin.email, "ravi@troika.ai");

        form.confirm_password = "other".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "Passwords do not match.");

        form.name = " ".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "All fields are required.");
    }

    #[test]
    fn test_company_form_requires_everything() {
        let form = NewCompanyForm {
            name: "Acme".into(),
            url: "acme.com".into(),
            email: "".into(),
            password: "pw".into(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_chatbot_name() {
        let company = Company {
            id: "c1".into(),
            name: "Acme".into(),
            url: String::new(),
            email: String::new(),
            chatbots: vec![],
        };
        assert_eq!(new_chatbot(&company, None).unwrap().name, "Acme Bot");
        assert_eq!(new_chatbot(&company, Some(" Helper ")).unwrap().name, "Helper");
        assert!(new_chatbot(&company, Some("  ")).is_err());
    }

    #[test]
    fn test_config_form_lists() {
        let form = ClientConfigForm {
            default_suggestions: " pricing, , demo ,".into(),
            demo_keywords: "".into(),
            ..Default::default()
        };
        let config = form.to_config();
        assert_eq!(config.default_suggestions, vec!["pricing", "demo"]);
        assert!(config.demo_keywords.is_empty());

        assert_eq!(ClientConfigForm::from(&config).default_suggestions, "pricing, demo");
    }

    #[test]
    fn test_renewal_months() {
        let plan = |days| Plan {
            id: "p".into(),
            duration_days: days,
            ..Default::default()
        };
        assert_eq!(renewal_months(&plan(Some(30))), 1);
        assert_eq!(renewal_months(&plan(Some(31))), 2);
        assert_eq!(renewal_months(&plan(Some(365))), 13);
        assert_eq!(renewal_months(&plan(None)), 1);

        let plans = vec![plan(Some(90))];
        assert_eq!(
            renewal_request(&plans, Some("p")).unwrap(),
            RenewRequest {
                plan_id: "p".into(),
                months: 3
            }
        );
        assert_eq!(
            renewal_request(&plans, None).unwrap_err().to_string(),
            "Please select a plan."
        );
        assert!(renewal_request(&plans, Some("missing")).is_err());
    }

    #[test]
    fn test_accepted_uploads() {
        assert!(is_accepted_upload("faq.txt"));
        assert!(is_accepted_upload("Brochure.PDF"));
        assert!(is_accepted_upload("a.b.docx"));
        assert!(!is_accepted_upload("image.png"));
        assert!(!is_accepted_upload("README"));
        assert!(!is_accepted_upload(".pdf"));
    }
}
