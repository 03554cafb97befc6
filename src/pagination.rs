//! Message Pagination
//!
//! Filter and page state for the message history view, and the query it
//! produces. Changing the filter value or kind always returns to page 1.

use serde::{Deserialize, Serialize};

/// Messages per page in the history view
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Quiet time after the last filter or page change before fetching
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Limit used to fetch a whole conversation for a single session
pub const CONVERSATION_LIMIT: u32 = 1000;

/// Which field the filter value is matched against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Session,
    #[default]
    Email,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Session => "session",
            FilterKind::Email => "email",
        }
    }
}

impl std::str::FromStr for FilterKind {
    type Err = crate::error::ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "session" | "session_id" => Ok(FilterKind::Session),
            "email" => Ok(FilterKind::Email),
            other => Err(crate::error::ClientError::Validation(format!(
                "Unknown filter type: {}",
                other
            ))),
        }
    }
}

/// Current page plus filter selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    page: u32,
    filter: String,
    kind: FilterKind,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            page: 1,
            filter: String::new(),
            kind: FilterKind::default(),
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Move to `page`; pages below 1 clamp to 1
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Replace the filter value and return to page 1
    pub fn set_filter(&mut self, value: impl Into<String>) {
        self.filter = value.into();
        self.page = 1;
    }

    /// Switch what the filter value matches and return to page 1
    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
        self.page = 1;
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(String::new());
    }

    /// Query for the current state
    pub fn query(&self, limit: u32) -> MessageQuery {
        let value = self.filter.trim();
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };

        let (email, session_id) = match self.kind {
            FilterKind::Email => (value, None),
            FilterKind::Session => (None, value),
        };

        MessageQuery {
            page: Some(self.page),
            limit,
            email,
            session_id,
        }
    }
}

/// Parameters of one message history request
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MessageQuery {
    /// Omitted for whole-conversation fetches
    pub page: Option<u32>,
    pub limit: u32,
    pub email: Option<String>,
    pub session_id: Option<String>,
}

impl MessageQuery {
    /// Every message of one session, for the conversation modal
    pub fn conversation_for_session(session_id: impl Into<String>) -> Self {
        Self {
            page: None,
            limit: CONVERSATION_LIMIT,
            email: None,
            session_id: Some(session_id.into()),
        }
    }

    /// Every message sent from one email, for the chat export
    pub fn conversation_for_email(email: impl Into<String>) -> Self {
        Self {
            page: None,
            limit: CONVERSATION_LIMIT,
            email: Some(email.into()),
            session_id: None,
        }
    }

    /// Query-string pairs in the order the backend logs them
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        if let Some(email) = &self.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(session_id) = &self.session_id {
            pairs.push(("session_id", session_id.clone()));
        }
        pairs
    }
}

/// Page position reported back with a page of results
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    page: u32,
    total_pages: u32,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
        }
    }
}

impl PageInfo {
    /// `total_pages` is at least 1 and `page` is clamped into `[1, total_pages]`
    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            page: page.clamp(1, total_pages),
            total_pages,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Same page count, positioned at `page`
    pub fn at(&self, page: u32) -> Self {
        Self::new(page, self.total_pages)
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn prev_disabled(&self) -> bool {
        self.page == 1
    }

    pub fn next_disabled(&self) -> bool {
        self.page == self.total_pages
    }

    /// Page after this one, if any
    pub fn next(&self) -> Option<u32> {
        (!self.next_disabled()).then(|| self.page + 1)
    }

    /// Page before this one, if any
    pub fn prev(&self) -> Option<u32> {
        (!self.prev_disabled()).then(|| self.page - 1)
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let state = FilterState::new();
        let query = state.query(DEFAULT_PAGE_SIZE);
        assert_eq!(
            query.to_query_pairs(),
            vec![("page", "1".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn test_switching_kind_resets_page() {
        let mut state = FilterState::new();
        state.set_filter("a@b.com");
        state.set_page(2);
        assert_eq!(
            state.query(10),
            MessageQuery {
                page: Some(2),
                limit: 10,
                email: Some("a@b.com".into()),
                session_id: None,
            }
        );

        state.set_kind(FilterKind::Session);
        let query = state.query(10);
        assert_eq!(query.page, Some(1));
        assert_eq!(query.email, None);
        assert_eq!(query.session_id.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut state = FilterState::new();
        state.set_page(5);
        state.set_filter("x");
        assert_eq!(state.page(), 1);

        state.set_page(3);
        state.clear_filter();
        assert_eq!(state.page(), 1);
        assert_eq!(state.query(10).email, None);
    }

    #[test]
    fn test_blank_filter_sends_no_param() {
        let mut state = FilterState::new();
        state.set_filter("   ");
        let pairs = state.query(10).to_query_pairs();
        assert!(pairs.iter().all(|(k, _)| *k != "email" && *k != "session_id"));
    }

    #[test]
    fn test_page_never_below_one() {
        let mut state = FilterState::new();
        state.set_page(0);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_conversation_query() {
        let pairs = MessageQuery::conversation_for_session("s-42").to_query_pairs();
        assert_eq!(
            pairs,
            vec![("limit", "1000".to_string()), ("session_id", "s-42".to_string())]
        );
    }

    #[test]
    fn test_page_info_bounds() {
        let info = PageInfo::new(1, 1);
        assert!(info.prev_disabled());
        assert!(info.next_disabled());
        assert_eq!(info.label(), "Page 1 of 1");

        let info = PageInfo::new(2, 3);
        assert_eq!(info.prev(), Some(1));
        assert_eq!(info.next(), Some(3));

        let info = PageInfo::new(9, 3);
        assert_eq!(info.page(), 3);
        assert!(info.next_disabled());
        assert_eq!(info.next(), None);

        let info = PageInfo::new(2, 3).at(1);
        assert!(info.prev_disabled());
        assert_eq!(info.prev(), None);
        assert_eq!(info.next(), Some(2));

        let info = PageInfo::new(0, 0);
        assert_eq!((info.page(), info.total_pages()), (1, 1));
    }

    #[test]
    fn test_filter_kind_parse() {
        assert_eq!("session".parse::<FilterKind>().unwrap(), FilterKind::Session);
        assert_eq!("EMAIL".parse::<FilterKind>().unwrap(), FilterKind::Email);
        assert!("phone".parse::<FilterKind>().is_err());
    }
}
