use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, InputMode, TOPICS};
use crate::internal::models::{Article, FeedState};
use crate::utils::datetime::format_fetch_time;

pub const LOADING_TEXT: &str = "Loading news...";
pub const NO_RESULTS_TEXT: &str = "No news articles available for your selected topic.";
pub const UNKNOWN_AUTHOR: &str = "Author: Unknown";

pub fn draw(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_top_bar(app, f, chunks[0]);
    render_feed(app, f, chunks[1]);
    render_status_bar(app, f, chunks[2]);

    match app.input_mode {
        InputMode::Search => render_search_overlay(app, f),
        InputMode::TopicSelect => render_topic_overlay(app, f),
        InputMode::Normal => {}
    }
}

/// Build the feed list items for a set of articles. Pure: same input, same
/// output, no I/O. The empty case is handled by the caller (a single
/// "no results" paragraph, never an empty list widget).
pub fn feed_items(articles: &[Article]) -> Vec<ListItem<'static>> {
    articles.iter().map(|a| ListItem::new(article_lines(a))).collect()
}

/// Render one article as its display lines: date, title, author,
/// optional image reference, description, action hints, separator.
pub fn article_lines(article: &Article) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(7);

    lines.push(Line::from(Span::styled(
        format_fetch_time(&article.published_at),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        article.title.clone(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));

    let author = match &article.author {
        Some(author) => format!("Author: {}", author),
        None => UNKNOWN_AUTHOR.to_string(),
    };
    lines.push(Line::from(Span::styled(
        author,
        Style::default().fg(Color::Gray),
    )));

    // The image line is omitted entirely when the article has no image.
    if let Some(image) = &article.url_to_image {
        lines.push(Line::from(Span::styled(
            format!("[image] {}", image),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(description) = &article.description {
        lines.push(Line::from(Span::raw(description.clone())));
    }

    lines.push(Line::from(Span::styled(
        "Enter: Read Article | s: Share on \u{1d54f}",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    lines
}

fn render_feed(app: &mut App, f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("News Feed - Topic: {}", app.topic));

    match &app.feed {
        FeedState::Idle | FeedState::Loading => {
            let p = Paragraph::new(LOADING_TEXT)
                .style(Style::default().fg(Color::Gray))
                .block(block)
                .alignment(Alignment::Center);
            f.render_widget(p, area);
        }
        FeedState::Ready(articles) if articles.is_empty() => {
            let p = Paragraph::new(NO_RESULTS_TEXT)
                .style(Style::default().fg(Color::Gray))
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(p, area);
        }
        FeedState::Ready(articles) => {
            let list = List::new(feed_items(articles))
                .block(block)
                .highlight_style(
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                );
            f.render_stateful_widget(list, area, &mut app.feed_list_state);
        }
        FeedState::Failed { message } => {
            let text = vec![
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::Gray),
                )),
            ];
            let p = Paragraph::new(text)
                .block(block.border_style(Style::default().fg(Color::Red)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(p, area);
        }
    }
}

fn render_top_bar(app: &App, f: &mut Frame, area: Rect) {
    let search = if app.search_input.is_empty() {
        String::new()
    } else {
        format!(" | Search: {}", app.search_input)
    };
    let text = format!("newsdeck v{}{}", app.app_version, search);
    let p = Paragraph::new(text)
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(p, area);
}

fn render_status_bar(app: &App, f: &mut Frame, area: Rect) {
    let sync_marker = if app.prefs_unsynced { " | (unsynced)" } else { "" };
    let status = if app.status_line.is_empty() {
        String::new()
    } else {
        format!("{}{} | ", app.status_line, sync_marker)
    };
    let text = format!(
        "{}j/k: Nav | Enter/o: Read | s: Share | r: Refresh | t: Topic | /: Search | q: Quit",
        status
    );
    let p = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
    f.render_widget(p, area);
}

fn render_search_overlay(app: &App, f: &mut Frame) {
    let area = f.area();
    let width = 60.min(area.width.saturating_sub(4));
    let height = 3;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    // █ as cursor
    let display = format!("{}\u{2588}", app.search_input);
    let search_box = Paragraph::new(display).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Custom search (Enter/Esc to finish) "),
    );

    f.render_widget(Clear, overlay);
    f.render_widget(search_box, overlay);
}

fn render_topic_overlay(app: &App, f: &mut Frame) {
    let area = f.area();
    let width = 30.min(area.width.saturating_sub(4));
    let height = (TOPICS.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    let items: Vec<ListItem> = TOPICS
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let style = if i == app.topic_cursor {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Span::styled(*topic, style))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Topic (Enter to apply) "),
    );

    f.render_widget(Clear, overlay);
    f.render_widget(list, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, author: Option<&str>, image: Option<&str>) -> Article {
        Article {
            title: title.to_string(),
            description: Some("desc".to_string()),
            author: author.map(str::to_string),
            url: "https://example.com/a".to_string(),
            url_to_image: image.map(str::to_string),
            published_at: "2026-08-30T10:00:00Z".to_string(),
        }
    }

    fn rendered_text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn absent_author_renders_unknown_literal() {
        let lines = article_lines(&article("T", None, None));
        assert!(rendered_text(&lines).contains("Author: Unknown"));
    }

    #[test]
    fn present_author_is_named() {
        let lines = article_lines(&article("T", Some("Jane Doe"), None));
        let text = rendered_text(&lines);
        assert!(text.contains("Author: Jane Doe"));
        assert!(!text.contains("Author: Unknown"));
    }

    #[test]
    fn image_line_omitted_when_no_image() {
        let without = article_lines(&article("T", Some("a"), None));
        assert!(!rendered_text(&without).contains("[image]"));

        let with = article_lines(&article("T", Some("a"), Some("https://img.example/x.jpg")));
        assert!(rendered_text(&with).contains("[image] https://img.example/x.jpg"));
    }

    #[test]
    fn feed_items_one_node_per_article_in_order() {
        let articles = vec![
            article("First", Some("a"), None),
            article("Second", Some("b"), None),
        ];
        let items = feed_items(&articles);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn empty_feed_produces_no_items() {
        assert!(feed_items(&[]).is_empty());
    }
}
