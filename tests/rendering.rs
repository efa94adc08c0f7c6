use ratatui::{Terminal, backend::TestBackend};
use tempfile::TempDir;

use newsdeck::app::App;
use newsdeck::config::AppConfig;
use newsdeck::internal::models::{Article, FeedState};
use newsdeck::internal::prefs::PrefStore;
use newsdeck::internal::ui::view;

fn test_app() -> (App, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let prefs = PrefStore::with_path(dir.path().join("preferences.json"));
    (App::new(AppConfig::default(), prefs), dir)
}

/// Render the app once and flatten the buffer into a single string for
/// content assertions.
fn render_to_text(app: &mut App) -> String {
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| view::draw(app, f)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect::<String>()
}

fn article(title: &str, author: Option<&str>, image: Option<&str>) -> Article {
    Article {
        title: title.to_string(),
        description: Some(format!("{title} description")),
        author: author.map(str::to_string),
        url: format!("https://example.com/{title}"),
        url_to_image: image.map(str::to_string),
        published_at: "2026-08-30T10:00:00Z".to_string(),
    }
}

#[test]
fn loading_state_shows_placeholder() {
    let (mut app, _dir) = test_app();
    app.feed = FeedState::Loading;

    let text = render_to_text(&mut app);
    assert!(text.contains(view::LOADING_TEXT));
}

#[test]
fn empty_feed_shows_exactly_one_no_results_node() {
    let (mut app, _dir) = test_app();
    app.feed = FeedState::Ready(Vec::new());

    let text = render_to_text(&mut app);
    assert_eq!(text.matches(view::NO_RESULTS_TEXT).count(), 1);
    assert!(!text.contains("Author:"));
}

#[test]
fn articles_render_in_order_with_author_fallback() {
    let (mut app, _dir) = test_app();
    app.feed = FeedState::Ready(vec![
        article("Alpha", Some("Jane Doe"), None),
        article("Beta", None, None),
    ]);
    app.feed_list_state.select(Some(0));

    let text = render_to_text(&mut app);
    assert!(text.contains("Alpha"));
    assert!(text.contains("Beta"));
    assert!(text.find("Alpha").unwrap() < text.find("Beta").unwrap());
    assert!(text.contains("Author: Jane Doe"));
    assert!(text.contains(view::UNKNOWN_AUTHOR));
}

#[test]
fn image_line_appears_only_when_image_present() {
    let (mut app, _dir) = test_app();
    app.feed = FeedState::Ready(vec![article("Solo", Some("a"), None)]);
    let text = render_to_text(&mut app);
    assert!(!text.contains("[image]"));

    app.feed = FeedState::Ready(vec![article(
        "Pictured",
        Some("a"),
        Some("https://img.example/x.jpg"),
    )]);
    let text = render_to_text(&mut app);
    assert!(text.contains("[image] https://img.example/x.jpg"));
}

#[test]
fn error_panel_shows_message_and_retry_hint() {
    let (mut app, _dir) = test_app();
    app.feed = FeedState::Failed {
        message: "Failed to load news: boom. Please try again later.".to_string(),
    };

    let text = render_to_text(&mut app);
    assert!(text.contains("Failed to load news: boom"));
    assert!(text.contains("Press r to retry"));
}

#[test]
fn status_bar_carries_reporter_text_and_sync_marker() {
    let (mut app, _dir) = test_app();
    app.status_line = "Last updated: August 30, 2026 10:05 | Articles: 2".to_string();
    app.prefs_unsynced = true;

    let text = render_to_text(&mut app);
    assert!(text.contains("Last updated: August 30, 2026 10:05 | Articles: 2"));
    assert!(text.contains("(unsynced)"));
}
