use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::ListState;
use strum_macros::Display;
use tracing::{debug, info, warn};

use crate::api::ApiService;
use crate::config::AppConfig;
use crate::internal::models::{Article, FeedState, FetchStatus};
use crate::internal::prefs::PrefStore;
use crate::internal::scheduler::Scheduler;
use crate::internal::ui::view;
use crate::utils::url::share_intent_url;

/// Topics offered by the selector. "all" disables topic filtering on the
/// server side.
pub const TOPICS: &[&str] = &[
    "all",
    "launches",
    "starship",
    "falcon",
    "dragon",
    "crew",
    "technology",
];

/// Input modes for the UI.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Search,
    TopicSelect,
}

/// Which user entry point asked the server to re-fetch from its source.
/// Both behave identically; only the failure wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum RefetchOrigin {
    Manual,
    Retry,
}

/// Actions/messages sent through the app action channel.
#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    NavigateUp,
    NavigateDown,
    OpenArticle,
    ShareArticle,
    RefreshFeed,
    FeedLoaded { seq: u64, articles: Vec<Article> },
    FeedFailed { seq: u64, message: String },
    RefreshStatus,
    StatusLoaded(FetchStatus),
    StatusFailed,
    TriggerRefetch(RefetchOrigin),
    RefetchSucceeded,
    RefetchFailed { origin: RefetchOrigin, message: String },
    SearchQuiet(u64),
    SyncPreferences,
    PreferencesSynced,
    PreferencesFailed(String),
    PeriodicRefresh,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub app_version: String,
    pub input_mode: InputMode,
    pub feed: FeedState,
    pub feed_list_state: ListState,
    /// Rendered status-reporter text; empty until the first status refresh.
    pub status_line: String,
    pub topic: String,
    pub search_input: String,
    /// Cursor inside the topic-selector popup.
    pub topic_cursor: usize,
    /// Local preference written but not yet acknowledged by the server.
    pub prefs_unsynced: bool,
    /// Fencing token: completions carrying an older seq are discarded, so a
    /// slow fetch can never overwrite a newer one.
    pub feed_seq: u64,
    /// Generation counter for the custom-search quiet window; only the timer
    /// matching the latest keystroke fires a sync.
    pub search_gen: u64,
    pub prefs: PrefStore,
    pub api: Arc<ApiService>,
    pub config: AppConfig,
    pub scheduler: Option<Scheduler>,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(config: AppConfig, prefs: PrefStore) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let api = Arc::new(ApiService::new(config.server_url.clone()));

        // Pre-fill the controls from the stored preference, exactly as the
        // form would be initialized.
        let stored = prefs.get();
        let topic_cursor = TOPICS
            .iter()
            .position(|t| *t == stored.topic)
            .unwrap_or(0);

        Self {
            running: true,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            input_mode: InputMode::Normal,
            feed: FeedState::Idle,
            feed_list_state: ListState::default(),
            status_line: String::new(),
            topic: stored.topic,
            search_input: stored.custom_search,
            topic_cursor,
            prefs_unsynced: false,
            feed_seq: 0,
            search_gen: 0,
            prefs,
            api,
            config,
            scheduler: None,
            action_tx,
            action_rx,
        }
    }

    pub async fn run(&mut self, mut tui: crate::tui::Tui) -> Result<()> {
        // Initial load: feed and status together, then the periodic timer.
        let _ = self.action_tx.send(Action::RefreshFeed);
        let _ = self.action_tx.send(Action::RefreshStatus);
        self.scheduler = Some(Scheduler::start(
            Duration::from_secs(self.config.refresh_interval_secs),
            self.action_tx.clone(),
        ));

        let mut event_interval = tokio::time::interval(std::time::Duration::from_millis(16));

        loop {
            tui.draw(|f| view::draw(self, f))?;

            tokio::select! {
                _ = event_interval.tick() => {
                    if event::poll(std::time::Duration::from_millis(0))?
                        && let Event::Key(key) = event::read()?
                        && key.kind == KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await;
                }
            }

            if !self.running {
                break;
            }
        }

        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Search => self.handle_search_input(key),
            InputMode::TopicSelect => self.handle_topic_input(key),
            InputMode::Normal => self.handle_normal_input(key),
        }
    }

    fn handle_normal_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                let _ = self.action_tx.send(Action::Quit);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let _ = self.action_tx.send(Action::NavigateDown);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let _ = self.action_tx.send(Action::NavigateUp);
            }
            KeyCode::Enter | KeyCode::Char('o') => {
                let _ = self.action_tx.send(Action::OpenArticle);
            }
            KeyCode::Char('s') => {
                let _ = self.action_tx.send(Action::ShareArticle);
            }
            KeyCode::Char('r') => {
                // Same pipeline either way; the error panel's retry only
                // differs in failure wording.
                let origin = if matches!(self.feed, FeedState::Failed { .. }) {
                    RefetchOrigin::Retry
                } else {
                    RefetchOrigin::Manual
                };
                let _ = self.action_tx.send(Action::TriggerRefetch(origin));
            }
            KeyCode::Char('t') => {
                self.topic_cursor = TOPICS
                    .iter()
                    .position(|t| *t == self.topic)
                    .unwrap_or(0);
                self.input_mode = InputMode::TopicSelect;
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
            }
            _ => {}
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.queue_search_sync();
            }
            KeyCode::Backspace => {
                if self.search_input.pop().is_some() {
                    self.queue_search_sync();
                }
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_topic_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.topic_cursor = (self.topic_cursor + 1) % TOPICS.len();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.topic_cursor = self.topic_cursor.checked_sub(1).unwrap_or(TOPICS.len() - 1);
            }
            KeyCode::Enter => {
                self.topic = TOPICS[self.topic_cursor].to_string();
                self.input_mode = InputMode::Normal;
                // Selection-control changes sync immediately, no quiet window.
                let _ = self.action_tx.send(Action::SyncPreferences);
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    /// Trailing-edge rate limiter for free-text edits: every keystroke bumps
    /// the generation and arms a fresh timer; only the timer that is still
    /// current when it elapses triggers a sync.
    pub fn queue_search_sync(&mut self) {
        self.search_gen += 1;
        let generation = self.search_gen;
        let quiet = Duration::from_millis(self.config.search_quiet_ms);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let _ = tx.send(Action::SearchQuiet(generation));
        });
    }

    pub async fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NavigateUp => self.select_prev(),
            Action::NavigateDown => self.select_next(),
            Action::OpenArticle => {
                if let Some(article) = self.selected_article() {
                    let _ = open::that(&article.url);
                }
            }
            Action::ShareArticle => {
                if let Some(article) = self.selected_article() {
                    let _ = open::that(share_intent_url(&article.title, &article.url));
                }
            }
            Action::RefreshFeed => {
                // Loading placeholder goes up immediately; the fetch result
                // comes back tagged with this seq.
                self.feed_seq += 1;
                let seq = self.feed_seq;
                self.feed = FeedState::Loading;
                self.feed_list_state.select(None);

                let api = self.api.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match api.fetch_articles().await {
                        Ok(articles) => {
                            let _ = tx.send(Action::FeedLoaded { seq, articles });
                        }
                        Err(e) => {
                            let message =
                                format!("Failed to load news: {e:#}. Please try again later.");
                            let _ = tx.send(Action::FeedFailed { seq, message });
                        }
                    }
                });
            }
            Action::FeedLoaded { seq, articles } => {
                if seq != self.feed_seq {
                    debug!(seq, latest = self.feed_seq, "discarding stale feed response");
                    return;
                }
                info!(count = articles.len(), "feed loaded");
                if articles.is_empty() {
                    self.feed_list_state.select(None);
                } else {
                    self.feed_list_state.select(Some(0));
                }
                self.feed = FeedState::Ready(articles);
            }
            Action::FeedFailed { seq, message } => {
                if seq != self.feed_seq {
                    debug!(seq, latest = self.feed_seq, "discarding stale feed failure");
                    return;
                }
                warn!(%message, "feed refresh failed");
                self.feed = FeedState::Failed { message };
                self.feed_list_state.select(None);
            }
            Action::RefreshStatus => {
                let api = self.api.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match api.fetch_status().await {
                        Ok(status) => {
                            let _ = tx.send(Action::StatusLoaded(status));
                        }
                        Err(e) => {
                            warn!(error = %format!("{e:#}"), "status refresh failed");
                            let _ = tx.send(Action::StatusFailed);
                        }
                    }
                });
            }
            Action::StatusLoaded(status) => {
                self.status_line = match status.last_fetch_time {
                    Some(raw) => format!(
                        "Last updated: {} | Articles: {}",
                        crate::utils::datetime::format_fetch_time(&raw),
                        status.articles_count
                    ),
                    None => "No data fetched yet".to_string(),
                };
            }
            Action::StatusFailed => {
                self.status_line = "Error fetching status".to_string();
            }
            Action::TriggerRefetch(origin) => {
                info!(%origin, "triggering server-side refetch");
                let api = self.api.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match api.trigger_refetch().await {
                        Ok(()) => {
                            let _ = tx.send(Action::RefetchSucceeded);
                        }
                        Err(e) => {
                            let _ = tx.send(Action::RefetchFailed {
                                origin,
                                message: format!("{e:#}"),
                            });
                        }
                    }
                });
            }
            Action::RefetchSucceeded => {
                // Feed first, then status, matching the order users see.
                let _ = self.action_tx.send(Action::RefreshFeed);
                let _ = self.action_tx.send(Action::RefreshStatus);
            }
            Action::RefetchFailed { origin, message } => {
                warn!(%origin, %message, "server-side refetch failed");
                let message = match origin {
                    RefetchOrigin::Retry => {
                        format!("Failed to retry: {message}. Please try again later.")
                    }
                    RefetchOrigin::Manual => {
                        format!("Failed to refresh: {message}. Please try again later.")
                    }
                };
                self.feed = FeedState::Failed { message };
                self.feed_list_state.select(None);
            }
            Action::SearchQuiet(generation) => {
                if generation != self.search_gen {
                    debug!(generation, latest = self.search_gen, "quiet-window timer superseded");
                    return;
                }
                let _ = self.action_tx.send(Action::SyncPreferences);
            }
            Action::SyncPreferences => {
                // Optimistic local write first; deliberately not rolled back
                // if the server call fails. `prefs_unsynced` stays up until
                // the next successful sync.
                self.prefs.set(&self.topic, &self.search_input);
                self.prefs_unsynced = true;

                let api = self.api.clone();
                let tx = self.action_tx.clone();
                let topic = self.topic.clone();
                let custom_search = self.search_input.clone();
                tokio::spawn(async move {
                    match api.push_preferences(&topic, &custom_search).await {
                        Ok(()) => {
                            let _ = tx.send(Action::PreferencesSynced);
                        }
                        Err(e) => {
                            let _ = tx.send(Action::PreferencesFailed(format!("{e:#}")));
                        }
                    }
                });
            }
            Action::PreferencesSynced => {
                info!(topic = %self.topic, "preferences acknowledged by server");
                self.prefs_unsynced = false;
                let _ = self.action_tx.send(Action::RefreshFeed);
                let _ = self.action_tx.send(Action::RefreshStatus);
            }
            Action::PreferencesFailed(message) => {
                warn!(%message, "preference sync failed");
                self.feed = FeedState::Failed {
                    message: format!(
                        "Failed to update preferences: {message}. Please try again later."
                    ),
                };
                self.feed_list_state.select(None);
            }
            Action::PeriodicRefresh => {
                info!("periodic refresh tick");
                let _ = self.action_tx.send(Action::RefreshFeed);
                let _ = self.action_tx.send(Action::RefreshStatus);
            }
        }
    }

    pub fn selected_article(&self) -> Option<&Article> {
        let FeedState::Ready(articles) = &self.feed else {
            return None;
        };
        self.feed_list_state
            .selected()
            .and_then(|i| articles.get(i))
    }

    fn article_count(&self) -> usize {
        match &self.feed {
            FeedState::Ready(articles) => articles.len(),
            _ => 0,
        }
    }

    fn select_next(&mut self) {
        let len = self.article_count();
        if len == 0 {
            return;
        }
        let i = match self.feed_list_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.feed_list_state.select(Some(i));
    }

    fn select_prev(&mut self) {
        let len = self.article_count();
        if len == 0 {
            return;
        }
        let i = match self.feed_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.feed_list_state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn test_app() -> App {
        let dir = std::env::temp_dir().join(format!("newsdeck-app-test-{}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        App::new(
            AppConfig::default(),
            PrefStore::with_path(dir.join("preferences.json")),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            ..Article::default()
        }
    }

    #[tokio::test]
    async fn stale_feed_response_is_discarded() {
        let mut app = test_app();
        app.feed = FeedState::Loading;
        app.feed_seq = 2;

        // A slow response from an earlier refresh resolves after a newer one
        // was issued: it must not win the render.
        app.handle_action(Action::FeedLoaded {
            seq: 1,
            articles: vec![article("old")],
        })
        .await;
        assert_eq!(app.feed, FeedState::Loading);

        app.handle_action(Action::FeedLoaded {
            seq: 2,
            articles: vec![article("new")],
        })
        .await;
        assert_eq!(app.feed, FeedState::Ready(vec![article("new")]));
        assert_eq!(app.feed_list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn stale_feed_failure_is_discarded() {
        let mut app = test_app();
        app.feed = FeedState::Ready(vec![article("kept")]);
        app.feed_seq = 3;

        app.handle_action(Action::FeedFailed {
            seq: 2,
            message: "too late".to_string(),
        })
        .await;
        assert_eq!(app.feed, FeedState::Ready(vec![article("kept")]));
    }

    #[tokio::test]
    async fn superseded_quiet_timer_does_not_sync() {
        let mut app = test_app();
        app.search_gen = 5;

        app.handle_action(Action::SearchQuiet(4)).await;
        assert!(app.action_rx.try_recv().is_err());

        app.handle_action(Action::SearchQuiet(5)).await;
        assert!(matches!(
            app.action_rx.try_recv(),
            Ok(Action::SyncPreferences)
        ));
    }

    #[tokio::test]
    async fn each_search_keystroke_arms_a_fresh_timer() {
        let mut app = test_app();
        app.input_mode = InputMode::Search;

        app.handle_key_event(key(KeyCode::Char('m')));
        app.handle_key_event(key(KeyCode::Char('a')));
        app.handle_key_event(key(KeyCode::Char('r')));
        app.handle_key_event(key(KeyCode::Char('s')));

        assert_eq!(app.search_input, "mars");
        // Only the last generation may trigger the sync.
        assert_eq!(app.search_gen, 4);
    }

    #[tokio::test]
    async fn status_line_reflects_fetch_status() {
        let mut app = test_app();

        app.handle_action(Action::StatusLoaded(FetchStatus {
            last_fetch_time: None,
            articles_count: 0,
        }))
        .await;
        assert_eq!(app.status_line, "No data fetched yet");

        app.handle_action(Action::StatusLoaded(FetchStatus {
            last_fetch_time: Some("2026-08-30T12:00:00Z".to_string()),
            articles_count: 7,
        }))
        .await;
        assert_eq!(
            app.status_line,
            "Last updated: August 30, 2026 12:00 | Articles: 7"
        );

        app.handle_action(Action::StatusFailed).await;
        assert_eq!(app.status_line, "Error fetching status");
    }

    #[tokio::test]
    async fn refetch_failure_wording_depends_on_origin() {
        let mut app = test_app();

        app.handle_action(Action::RefetchFailed {
            origin: RefetchOrigin::Retry,
            message: "connection refused".to_string(),
        })
        .await;
        let FeedState::Failed { message } = &app.feed else {
            panic!("expected failed feed");
        };
        assert!(message.starts_with("Failed to retry:"));

        app.handle_action(Action::RefetchFailed {
            origin: RefetchOrigin::Manual,
            message: "connection refused".to_string(),
        })
        .await;
        let FeedState::Failed { message } = &app.feed else {
            panic!("expected failed feed");
        };
        assert!(message.starts_with("Failed to refresh:"));
    }

    #[tokio::test]
    async fn retry_key_origin_depends_on_feed_state() {
        let mut app = test_app();

        app.handle_key_event(key(KeyCode::Char('r')));
        assert!(matches!(
            app.action_rx.try_recv(),
            Ok(Action::TriggerRefetch(RefetchOrigin::Manual))
        ));

        app.feed = FeedState::Failed {
            message: "boom".to_string(),
        };
        app.handle_key_event(key(KeyCode::Char('r')));
        assert!(matches!(
            app.action_rx.try_recv(),
            Ok(Action::TriggerRefetch(RefetchOrigin::Retry))
        ));
    }

    #[tokio::test]
    async fn topic_confirm_syncs_immediately() {
        let mut app = test_app();
        app.handle_key_event(key(KeyCode::Char('t')));
        assert_eq!(app.input_mode, InputMode::TopicSelect);

        app.handle_key_event(key(KeyCode::Char('j')));
        app.handle_key_event(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.topic, TOPICS[1]);
        assert!(matches!(
            app.action_rx.try_recv(),
            Ok(Action::SyncPreferences)
        ));
    }

    #[tokio::test]
    async fn navigation_wraps_around_the_feed() {
        let mut app = test_app();
        app.feed = FeedState::Ready(vec![article("a"), article("b")]);
        app.feed_list_state.select(Some(0));

        app.handle_action(Action::NavigateDown).await;
        assert_eq!(app.feed_list_state.selected(), Some(1));
        app.handle_action(Action::NavigateDown).await;
        assert_eq!(app.feed_list_state.selected(), Some(0));
        app.handle_action(Action::NavigateUp).await;
        assert_eq!(app.feed_list_state.selected(), Some(1));
    }
}
