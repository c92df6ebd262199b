use chrono::{DateTime, NaiveDateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::api::{ChatHistoryEntry, ChatRole, SymptomHistoryEntry};
use crate::config::config::IconConfig;
use crate::state::app_state::HistoryPanel;
use crate::widgets::risk_badge::risk_badge;

/// Saved chat and symptom history, side by side
pub struct HistoryWidget<'a> {
    panel: &'a HistoryPanel,
    icons: &'a IconConfig,
}

impl<'a> HistoryWidget<'a> {
    pub fn new(panel: &'a HistoryPanel, icons: &'a IconConfig) -> Self {
        Self { panel, icons }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.render_chat(f, columns[0]);
        self.render_symptoms(f, columns[1]);
    }

    fn render_chat(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} Chat history (c to load)", self.icons.history));

        if let Some(body) = status_text(
            self.panel.chat_loading,
            self.panel.chat_error.as_deref(),
            self.panel.chat_entries.is_empty(),
            "No saved chats yet.",
        ) {
            f.render_widget(Paragraph::new(body).block(block).wrap(Wrap { trim: true }), area);
            return;
        }

        let items: Vec<ListItem> = self
            .panel
            .chat_entries
            .iter()
            .map(|entry| ListItem::new(self.chat_line(entry)))
            .collect();
        f.render_widget(List::new(items).block(block), area);
    }

    fn chat_line(&self, entry: &ChatHistoryEntry) -> Line<'static> {
        let (icon, style) = match entry.role {
            ChatRole::User => (&self.icons.user, Style::default().fg(Color::Cyan)),
            ChatRole::Assistant => (&self.icons.assistant, Style::default().fg(Color::White)),
        };
        Line::from(vec![
            Span::styled(
                format!("{:>4} ", format_time_ago(&entry.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(format!("{} ", icon)),
            Span::styled(entry.content.clone(), style),
        ])
    }

    fn render_symptoms(&self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(format!(
            "{} Symptom checks (s to load)",
            self.icons.symptoms
        ));

        if let Some(body) = status_text(
            self.panel.symptom_loading,
            self.panel.symptom_error.as_deref(),
            self.panel.symptom_entries.is_empty(),
            "No saved symptom checks yet.",
        ) {
            f.render_widget(Paragraph::new(body).block(block).wrap(Wrap { trim: true }), area);
            return;
        }

        let items: Vec<ListItem> = self
            .panel
            .symptom_entries
            .iter()
            .map(|entry| ListItem::new(symptom_lines(entry)))
            .collect();
        f.render_widget(List::new(items).block(block), area);
    }
}

fn status_text(
    loading: bool,
    error: Option<&str>,
    empty: bool,
    empty_text: &'static str,
) -> Option<Line<'static>> {
    if loading {
        Some(Line::styled("Loading...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = error {
        Some(Line::styled(error.to_string(), Style::default().fg(Color::Red)))
    } else if empty {
        Some(Line::styled(empty_text, Style::default().fg(Color::DarkGray)))
    } else {
        None
    }
}

fn symptom_lines(entry: &SymptomHistoryEntry) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            risk_badge(entry.risk_level),
            Span::styled(
                format!(" {} ", format_time_ago(&entry.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                entry.symptoms_text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!("  {}", entry.advice)),
    ]
}

/// Parse a backend timestamp. Naive timestamps are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|t| t.and_utc())
        })
}

pub fn format_time_ago(raw: &str) -> String {
    let Some(timestamp) = parse_timestamp(raw) else {
        return "?".to_string();
    };
    let elapsed = Utc::now() - timestamp;
    if elapsed.num_days() > 0 {
        format!("{}d", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h", elapsed.num_hours())
    } else if elapsed.num_minutes() > 0 {
        format!("{}m", elapsed.num_minutes())
    } else {
        "now".to_string()
    }
}
