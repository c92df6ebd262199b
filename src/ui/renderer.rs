use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::api::ChatRole;
use crate::config::config::IconConfig;
use crate::state::{AppState, AuthMode, Field, View};
use crate::utils::logging::LogRingBuffer;
use crate::widgets::history_widget::HistoryWidget;
use crate::widgets::log_widget::LogWidget;
use crate::widgets::nav_bar_widget::NavBarWidget;
use crate::widgets::risk_badge::{flag_items, summary_lines};

/// Everything the renderer needs besides the state
pub struct RenderContext {
    pub icons: IconConfig,
    pub show_key_hints: bool,
    pub backend: String,
    pub logs: Option<LogRingBuffer>,
}

pub fn draw(f: &mut Frame, state: &AppState, ctx: &RenderContext) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    let nav = NavBarWidget::new(
        state.view,
        state.session.as_ref().map(|s| s.email.clone()),
    );
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(nav.width()), Constraint::Min(20)])
        .split(rows[0]);
    nav.render(f, columns[0]);

    let main = match (&ctx.logs, state.show_logs) {
        (Some(logs), true) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(columns[1]);
            LogWidget::from_buffer(logs, split[1].height).render(f, split[1]);
            split[0]
        }
        _ => columns[1],
    };

    let main = match state.login_reminder() {
        Some(reminder) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(3)])
                .split(main);
            f.render_widget(
                Paragraph::new(Line::styled(
                    format!("{} {}", ctx.icons.info, reminder),
                    Style::default().fg(Color::Yellow),
                )),
                split[0],
            );
            split[1]
        }
        None => main,
    };

    match state.view {
        View::Home => draw_home(f, main, state),
        View::Symptoms => draw_symptoms(f, main, state, ctx),
        View::Chat => draw_chat(f, main, state, ctx),
        View::Hospitals => draw_hospitals(f, main, state, ctx),
        View::History => HistoryWidget::new(&state.history, &ctx.icons).render(f, main),
    }

    draw_status_line(f, rows[1], state, ctx);
}

fn input_line(state: &AppState, field: Field) -> Line<'static> {
    let focused = state.focused_field() == Some(field);
    let value = state.field_value(field);
    let shown = if field == Field::Password {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };

    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "_" } else { "" };

    Line::from(vec![
        Span::styled(format!("{}: ", field.label()), label_style),
        Span::raw(shown),
        Span::styled(cursor, Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ])
}

fn text_width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Word-wrap `text` into rows no wider than `width` columns. Words longer
/// than a row are split. Embedded newlines start a new row.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = text_width(word);
            if row_width > 0 && row_width + 1 + word_width > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }

            if word_width <= width {
                if row_width > 0 {
                    row.push(' ');
                    row_width += 1;
                }
                row.push_str(word);
                row_width += word_width;
                continue;
            }

            // Wider than a whole row; the row is empty at this point
            for ch in word.chars() {
                let ch_width = text_width(ch.encode_utf8(&mut [0; 4]));
                if row_width > 0 && row_width + ch_width > width {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push(ch);
                row_width += ch_width;
            }
        }
        rows.push(row);
    }
    rows
}

/// Append `text` as wrapped rows, the first led by `prefix` and the rest
/// indented to line up under it.
fn push_wrapped(
    rows: &mut Vec<Line<'static>>,
    prefix: &str,
    text: &str,
    style: Style,
    width: usize,
) {
    let prefix_width = text_width(prefix);
    let indent = " ".repeat(prefix_width);
    let body_width = width.saturating_sub(prefix_width).max(1);

    for (i, row) in wrap_text(text, body_width).into_iter().enumerate() {
        let lead = if i == 0 { prefix.to_string() } else { indent.clone() };
        rows.push(Line::from(vec![Span::raw(lead), Span::styled(row, style)]));
    }
}

fn error_line(icons: &IconConfig, message: &str) -> Line<'static> {
    Line::styled(
        format!("{} {}", icons.error, message),
        Style::default().fg(Color::Red),
    )
}

fn draw_home(f: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = vec![
        Line::styled(
            "SafeLink AI",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from("Symptom triage, a health chat assistant and nearby care."),
        Line::from(""),
    ];

    match &state.session {
        Some(session) => {
            lines.push(Line::from(format!("Signed in as {}.", session.email)));
            lines.push(Line::from(
                "Your chats and symptom checks are saved to My History. Ctrl+L signs out.",
            ));
        }
        None => {
            let (title, hint) = match state.auth.mode {
                AuthMode::Login => ("Log in", "No account? Ctrl+T to sign up."),
                AuthMode::Signup => ("Sign up", "Have an account? Ctrl+T to log in."),
            };
            lines.push(Line::styled(
                title,
                Style::default().add_modifier(Modifier::UNDERLINED),
            ));
            lines.push(input_line(state, Field::Email));
            lines.push(input_line(state, Field::Password));
            lines.push(Line::from(""));
            if state.auth.loading {
                lines.push(Line::styled("Please wait...", Style::default().fg(Color::Yellow)));
            }
            if let Some(error) = &state.auth.error {
                lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
            }
            lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(View::Home.title()))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_symptoms(f: &mut Frame, area: Rect, state: &AppState, ctx: &RenderContext) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(4)])
        .split(area);

    let mut form = vec![
        input_line(state, Field::Age),
        input_line(state, Field::Temperature),
        input_line(state, Field::Symptoms),
        Line::from(""),
    ];
    if state.symptoms.loading {
        form.push(Line::styled("Checking...", Style::default().fg(Color::Yellow)));
    } else {
        form.push(Line::styled(
            "Enter to check. This is not a diagnosis.",
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(
        Paragraph::new(form).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} {}", ctx.icons.symptoms, View::Symptoms.title())),
        ),
        split[0],
    );

    let result_block = Block::default().borders(Borders::ALL).title("Result");
    if let Some(error) = &state.symptoms.error {
        f.render_widget(
            Paragraph::new(error_line(&ctx.icons, error))
                .block(result_block)
                .wrap(Wrap { trim: true }),
            split[1],
        );
        return;
    }
    let Some(result) = &state.symptoms.result else {
        f.render_widget(result_block, split[1]);
        return;
    };

    let inner = result_block.inner(split[1]);
    f.render_widget(result_block, split[1]);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(inner);
    f.render_widget(
        Paragraph::new(summary_lines(result)).wrap(Wrap { trim: true }),
        parts[0],
    );
    f.render_widget(
        List::new(flag_items(&result.detected_flags)).block(
            Block::default()
                .borders(Borders::TOP)
                .title("Detected flags"),
        ),
        parts[1],
    );
}

fn draw_chat(f: &mut Frame, area: Rect, state: &AppState, ctx: &RenderContext) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    // Rows are wrapped here, not by the paragraph, so the tail offset
    // counts exactly what ends up on screen
    let width = split[0].width.saturating_sub(2) as usize;
    let mut rows: Vec<Line> = Vec::new();
    for message in &state.chat.messages {
        let (icon, style) = match message.role {
            ChatRole::User => (&ctx.icons.user, Style::default().fg(Color::Cyan)),
            ChatRole::Assistant => (&ctx.icons.assistant, Style::default()),
        };
        push_wrapped(&mut rows, &format!("{} ", icon), &message.content, style, width);
        rows.push(Line::from(""));
    }
    if state.chat.loading {
        let style = Style::default().fg(Color::DarkGray);
        let prefix = format!("{} ", ctx.icons.assistant);
        push_wrapped(&mut rows, &prefix, "thinking...", style, width);
    }
    if let Some(error) = &state.chat.error {
        let style = Style::default().fg(Color::Red);
        push_wrapped(&mut rows, &format!("{} ", ctx.icons.error), error, style, width);
    }

    // Keep the newest rows in view
    let visible = split[0].height.saturating_sub(2) as usize;
    let skip = rows.len().saturating_sub(visible);
    let rows: Vec<Line> = rows.into_iter().skip(skip).collect();

    f.render_widget(
        Paragraph::new(rows)
            .block(Block::default().borders(Borders::ALL).title(View::Chat.title())),
        split[0],
    );
    f.render_widget(
        Paragraph::new(input_line(state, Field::ChatInput))
            .block(Block::default().borders(Borders::ALL)),
        split[1],
    );
}

fn draw_hospitals(f: &mut Frame, area: Rect, state: &AppState, ctx: &RenderContext) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "{} {} (f or Enter to search)",
        ctx.icons.hospital,
        View::Hospitals.title()
    ));
    let panel = &state.hospitals;

    let status = if panel.loading {
        Some(Line::styled("Searching near you...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = &panel.error {
        Some(error_line(&ctx.icons, error))
    } else if panel.hospitals.is_empty() {
        let text = if panel.searched {
            "No hospitals found nearby."
        } else {
            "Find hospitals and clinics close to your position."
        };
        Some(Line::styled(text, Style::default().fg(Color::DarkGray)))
    } else {
        None
    };

    if let Some(status) = status {
        f.render_widget(Paragraph::new(status).block(block).wrap(Wrap { trim: true }), area);
        return;
    }

    let items: Vec<ListItem> = panel
        .hospitals
        .iter()
        .map(|h| {
            let mut lines = vec![Line::styled(
                h.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if h.address != h.name {
                lines.push(Line::from(format!("  {}", h.address)));
            }
            if let Some(url) = &h.maps_url {
                lines.push(Line::styled(format!("  {}", url), Style::default().fg(Color::Blue)));
            }
            ListItem::new(lines)
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn draw_status_line(f: &mut Frame, area: Rect, state: &AppState, ctx: &RenderContext) {
    let mut spans = vec![Span::styled(
        format!(" {} ", state.view.title()),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    )];

    let in_flight = state.in_flight();
    if in_flight > 0 {
        spans.push(Span::styled(
            format!(" {} pending ", in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        format!(" {} ", ctx.backend),
        Style::default().fg(Color::DarkGray),
    ));
    if ctx.show_key_hints {
        spans.push(Span::styled(
            " F1-F5 views  Tab focus  Enter submit  F6 logs  Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatMessage, RiskLevel, Session, SymptomCheckResult};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn context() -> RenderContext {
        RenderContext {
            icons: IconConfig::simple(),
            show_key_hints: true,
            backend: "http://localhost:8000".to_string(),
            logs: None,
        }
    }

    fn render(state: &AppState) -> Buffer {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, state, &context())).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text_of(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_symptom_result_renders_badge_and_flags() {
        let mut state = AppState::default();
        state.view = View::Symptoms;
        state.symptoms.result = Some(SymptomCheckResult {
            risk_level: RiskLevel::High,
            risk_score: 85,
            advice: "Seek emergency care now.".to_string(),
            detected_flags: vec!["chest_pain".to_string(), "high_fever".to_string()],
        });

        let text = text_of(&render(&state));
        assert!(text.contains("HIGH risk"));
        assert!(text.contains("score 85/100"));
        let first = text.find("chest_pain").unwrap();
        let second = text.find("high_fever").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_login_reminder_when_logged_out() {
        let mut state = AppState::default();
        state.view = View::Chat;
        let text = text_of(&render(&state));
        assert!(text.contains("Please sign in on the Home page"));

        state.session = Some(Session {
            user_id: 3,
            email: "efua@example.com".to_string(),
        });
        let text = text_of(&render(&state));
        assert!(!text.contains("Please sign in on the Home page"));
        assert!(text.contains("efua@example.com"));
    }

    #[test]
    fn test_password_is_masked() {
        let mut state = AppState::default();
        state.auth.password = "hunter22".to_string();
        let text = text_of(&render(&state));
        assert!(!text.contains("hunter22"));
        assert!(text.contains("********"));
    }

    #[test]
    fn test_chat_tail_visible_after_long_replies() {
        let mut state = AppState::default();
        state.view = View::Chat;
        state.session = Some(Session {
            user_id: 3,
            email: "efua@example.com".to_string(),
        });
        let long_reply = "Drink plenty of fluids and rest in a cool room. ".repeat(10);
        for i in 0..3 {
            state.chat.messages.push(ChatMessage::user(format!("question {}", i)));
            state
                .chat
                .messages
                .push(ChatMessage::assistant(format!("{}reply {} ends", long_reply, i)));
        }
        state.chat.messages.push(ChatMessage::user("still there?"));
        state.chat.error = Some(
            "Request timed out (30s limit reached). The AI model is taking too long to respond."
                .to_string(),
        );

        let text = text_of(&render(&state));
        assert!(text.contains("reply 2 ends"));
        assert!(text.contains("still there?"));
        assert!(text.contains("Request timed out"));
        assert_eq!(text.matches("Request timed out").count(), 1);
    }

    #[test]
    fn test_wrap_text_rows_fit_width() {
        let rows = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(
            rows,
            vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
        assert!(rows.iter().all(|r| text_width(r) <= 10));

        assert_eq!(wrap_text("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
        assert_eq!(wrap_text("one\ntwo", 20), vec!["one", "two"]);
        assert_eq!(wrap_text("", 20), vec![""]);
    }
}
