use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::utils::logging::{LogEntry, LogRingBuffer};

/// Recent log lines, toggled with F6
pub struct LogWidget {
    entries: Vec<LogEntry>,
}

impl LogWidget {
    /// Take the newest entries that fit in `height` rows
    pub fn from_buffer(buffer: &LogRingBuffer, height: u16) -> Self {
        Self {
            entries: buffer.get_recent(height.saturating_sub(2) as usize),
        }
    }

    fn level_style(level: &str) -> Style {
        match level {
            "ERROR" => Style::default().fg(Color::Red),
            "WARN" => Style::default().fg(Color::Yellow),
            "INFO" => Style::default().fg(Color::Green),
            _ => Style::default().fg(Color::DarkGray),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .entries
            .iter()
            .map(|e| {
                Line::from(vec![
                    Span::styled(format!("{} ", e.timestamp), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("{:<5} ", e.level), Self::level_style(&e.level)),
                    Span::styled(format!("[{}] ", e.target), Style::default().fg(Color::Cyan)),
                    Span::raw(e.message.clone()),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Logs (F6 to close)"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }
}
