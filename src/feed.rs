//! Debounced Message Feed
//!
//! Drives the message history view. Every change to page, filter value or
//! filter kind restarts a debounce window; once the window passes quietly
//! exactly one fetch is issued. Fetches are ticketed, and a response that
//! is not for the latest ticket is dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::dto::MessagePage;
use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::Message;
use crate::pagination::{
    FilterKind, FilterState, MessageQuery, PageInfo, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE,
};
use crate::sequence::RequestSequencer;

pub use crate::notify::FETCH_FAILED;

/// Where pages of messages come from
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_messages(&self, query: &MessageQuery) -> ClientResult<MessagePage>;
}

#[async_trait]
impl MessageSource for ApiClient {
    async fn fetch_messages(&self, query: &MessageQuery) -> ClientResult<MessagePage> {
        self.user_messages(query).await
    }
}

/// Feed tuning
#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub page_size: u32,
    pub debounce: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// What the view renders
#[derive(Clone, Debug, Default)]
pub struct FeedSnapshot {
    pub messages: Vec<Message>,
    pub page: PageInfo,
    pub loading: bool,
    /// Notification text of the last failed fetch
    pub error: Option<String>,
}

/// Handle to a running feed; dropping it stops the feed
pub struct MessageFeed {
    filter_tx: watch::Sender<FilterState>,
    snapshot_tx: Arc<watch::Sender<FeedSnapshot>>,
    snapshot_rx: watch::Receiver<FeedSnapshot>,
    task: JoinHandle<()>,
}

impl MessageFeed {
    /// Start the feed on the current tokio runtime.
    ///
    /// The first page is fetched one debounce window after start.
    pub fn spawn<S: MessageSource + 'static>(source: Arc<S>, config: FeedConfig) -> Self {
        let (filter_tx, filter_rx) = watch::channel(FilterState::new());
        let (snapshot_tx, snapshot_rx) = watch::channel(FeedSnapshot::default());
        let snapshot_tx = Arc::new(snapshot_tx);

        let task = tokio::spawn(run(source, config, filter_rx, Arc::clone(&snapshot_tx)));

        Self {
            filter_tx,
            snapshot_tx,
            snapshot_rx,
            task,
        }
    }

    pub fn set_page(&self, page: u32) {
        self.filter_tx.send_modify(|s| s.set_page(page));
    }

    /// Paging position: the requested page, bounded by the last page count
    pub fn page_info(&self) -> PageInfo {
        let page = self.filter_tx.borrow().page();
        self.snapshot_rx.borrow().page.at(page)
    }

    /// Advance one page; `false` if already on the last page
    pub fn next_page(&self) -> bool {
        match self.page_info().next() {
            Some(page) => {
                self.set_page(page);
                true
            }
            None => false,
        }
    }

    /// Go back one page; `false` if already on the first page
    pub fn prev_page(&self) -> bool {
        match self.page_info().prev() {
            Some(page) => {
                self.set_page(page);
                true
            }
            None => false,
        }
    }

    pub fn set_filter(&self, value: impl Into<String>) {
        let value = value.into();
        self.filter_tx.send_modify(|s| s.set_filter(value));
        self.forget_page_count();
    }

    pub fn set_kind(&self, kind: FilterKind) {
        self.filter_tx.send_modify(|s| s.set_kind(kind));
        self.forget_page_count();
    }

    pub fn clear_filter(&self) {
        self.filter_tx.send_modify(|s| s.clear_filter());
        self.forget_page_count();
    }

    /// The old page count does not describe the new filter
    fn forget_page_count(&self) {
        self.snapshot_tx.send_modify(|s| s.page = PageInfo::default());
    }

    pub fn filter(&self) -> FilterState {
        self.filter_tx.borrow().clone()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that wakes on every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_rx.clone()
    }
}

impl Drop for MessageFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<S: MessageSource + 'static>(
    source: Arc<S>,
    config: FeedConfig,
    mut filter_rx: watch::Receiver<FilterState>,
    snapshot_tx: Arc<watch::Sender<FeedSnapshot>>,
) {
    let sequencer = Arc::new(RequestSequencer::new());

    loop {
        // Wait for a quiet window; each change restarts it.
        loop {
            match tokio::time::timeout(config.debounce, filter_rx.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return,
                Err(_) => break,
            }
        }

        let query = filter_rx.borrow_and_update().query(config.page_size);
        let ticket = sequencer.issue();
        snapshot_tx.send_modify(|s| s.loading = true);

        tracing::debug!(ticket = ticket.id(), query = ?query, "Fetching messages");

        let source = Arc::clone(&source);
        let sequencer = Arc::clone(&sequencer);
        let snapshot_tx = Arc::clone(&snapshot_tx);
        tokio::spawn(async move {
            let result = source.fetch_messages(&query).await;

            if !sequencer.is_current(ticket) {
                tracing::debug!(ticket = ticket.id(), "Discarding stale message page");
                return;
            }

            snapshot_tx.send_modify(|s| {
                s.loading = false;
                match result {
                    Ok(page) => {
                        let requested = query.page.unwrap_or(1);
                        s.page = PageInfo::new(requested, page.total_pages.unwrap_or(1));
                        s.messages = page.messages;
                        s.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Message fetch failed");
                        s.error = Some(e.user_message(FETCH_FAILED));
                    }
                }
            });
        });

        if filter_rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::models::Sender;
    use std::sync::Mutex;

    /// Echoes the filter back as message content after an optional delay
    #[derive(Default)]
    struct FakeSource {
        queries: Mutex<Vec<MessageQuery>>,
        slow_filter: Option<&'static str>,
        fail: bool,
    }

    impl FakeSource {
        fn queries(&self) -> Vec<MessageQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSource for FakeSource {
        async fn fetch_messages(&self, query: &MessageQuery) -> ClientResult<MessagePage> {
            self.queries.lock().unwrap().push(query.clone());

            let filter = query
                .email
                .clone()
                .or_else(|| query.session_id.clone())
                .unwrap_or_default();

            let delay = if self.slow_filter == Some(filter.as_str()) { 1000 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if self.fail {
                return Err(ClientError::Transport("connection reset".into()));
            }

            Ok(MessagePage {
                messages: vec![Message {
                    sender: Sender::User,
                    content: filter,
                    timestamp: chrono::Utc::now(),
                    session_id: None,
                    email: None,
                }],
                total_pages: Some(3),
            })
        }
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_after_debounce() {
        let source = Arc::new(FakeSource::default());
        let feed = MessageFeed::spawn(source.clone(), FeedConfig::default());

        wait(200).await;
        assert!(source.queries().is_empty());

        wait(200).await;
        assert_eq!(source.queries(), vec![FilterState::new().query(10)]);
        assert_eq!(feed.snapshot().page.label(), "Page 1 of 3");
        assert!(!feed.snapshot().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_changes_issues_one_fetch() {
        let source = Arc::new(FakeSource::default());
        let feed = MessageFeed::spawn(source.clone(), FeedConfig::default());

        feed.set_filter("a");
        wait(100).await;
        feed.set_filter("a@b");
        wait(200).await;
        feed.set_filter("a@b.com");
        // 300ms since start but only just changed
        wait(200).await;
        assert!(source.queries().is_empty());

        wait(200).await;
        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_kind_refetches_page_one() {
        let source = Arc::new(FakeSource::default());
        let feed = MessageFeed::spawn(source.clone(), FeedConfig::default());

        feed.set_filter("a@b.com");
        feed.set_page(2);
        wait(400).await;

        feed.set_kind(FilterKind::Session);
        assert_eq!(feed.filter().page(), 1);
        wait(400).await;

        let queries = source.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].page, Some(2));
        assert_eq!(queries[0].email.as_deref(), Some("a@b.com"));
        assert_eq!(
            queries[1],
            MessageQuery {
                page: Some(1),
                limit: 10,
                email: None,
                session_id: Some("a@b.com".into()),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let source = Arc::new(FakeSource {
            slow_filter: Some("slow"),
            ..Default::default()
        });
        let feed = MessageFeed::spawn(source.clone(), FeedConfig::default());

        feed.set_filter("slow");
        wait(350).await;
        feed.set_filter("fast");
        wait(350).await;
        assert_eq!(feed.snapshot().messages[0].content, "fast");

        // the slow response lands after the fast one
        wait(1000).await;
        assert_eq!(source.queries().len(), 2);
        assert_eq!(feed.snapshot().messages[0].content, "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_bounds() {
        let source = Arc::new(FakeSource::default());
        let feed = MessageFeed::spawn(source.clone(), FeedConfig::default());

        assert!(!feed.prev_page());
        wait(400).await;

        assert!(feed.next_page());
        assert_eq!(feed.filter().page(), 2);
        wait(400).await;
        assert_eq!(feed.snapshot().page.label(), "Page 2 of 3");

        feed.set_page(3);
        wait(400).await;
        assert!(feed.snapshot().page.next_disabled());
        assert!(!feed.next_page());
        assert!(feed.prev_page());
        assert_eq!(feed.filter().page(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_follows_filter_reset() {
        let source = Arc::new(FakeSource::default());
        let feed = MessageFeed::spawn(source.clone(), FeedConfig::default());

        feed.set_page(3);
        wait(400).await;
        assert_eq!(feed.snapshot().page.label(), "Page 3 of 3");

        feed.set_filter("a@b.com");
        assert_eq!(feed.filter().page(), 1);
        assert!(feed.page_info().prev_disabled());
        assert!(!feed.prev_page());
        assert!(!feed.next_page());
        assert_eq!(feed.filter().page(), 1);

        wait(400).await;
        let queries = source.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].page, Some(1));
        assert_eq!(queries[1].email.as_deref(), Some("a@b.com"));
        assert_eq!(feed.page_info().label(), "Page 1 of 3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_error_text() {
        let source = Arc::new(FakeSource {
            fail: true,
            ..Default::default()
        });
        let feed = MessageFeed::spawn(source, FeedConfig::default());

        wait(400).await;
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.error.as_deref(), Some(FETCH_FAILED));
        assert!(!snapshot.loading);
    }
}
