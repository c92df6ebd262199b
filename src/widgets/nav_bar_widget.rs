use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::state::View;

/// Sidebar listing the views with their function-key shortcuts
pub struct NavBarWidget {
    current: View,
    /// Email of the signed-in user, shown under the list
    signed_in_as: Option<String>,
    show_shortcuts: bool,
}

impl NavBarWidget {
    pub fn new(current: View, signed_in_as: Option<String>) -> Self {
        Self {
            current,
            signed_in_as,
            show_shortcuts: true,
        }
    }

    pub fn with_shortcuts(mut self, show: bool) -> Self {
        self.show_shortcuts = show;
        self
    }

    /// One line per view, the current one highlighted
    pub fn lines(&self) -> Vec<Line<'static>> {
        View::ALL
            .iter()
            .enumerate()
            .map(|(i, view)| {
                let mut spans = vec![];
                if self.show_shortcuts {
                    spans.push(Span::styled(
                        format!("F{} ", i + 1),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::DIM),
                    ));
                }

                let style = if *view == self.current {
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                spans.push(Span::styled(view.title().to_string(), style));
                Line::from(spans)
            })
            .collect()
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let mut items: Vec<ListItem> = self.lines().into_iter().map(ListItem::new).collect();

        items.push(ListItem::new(Line::from("")));
        let account = match &self.signed_in_as {
            Some(email) => Span::styled(email.clone(), Style::default().fg(Color::Green)),
            None => Span::styled("Not signed in", Style::default().fg(Color::DarkGray)),
        };
        items.push(ListItem::new(Line::from(account)));

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title("SafeLink"),
        );
        f.render_widget(list, area);
    }

    /// Width needed to show the longest entry inside the border
    pub fn width(&self) -> u16 {
        let longest = View::ALL
            .iter()
            .map(|v| v.title().len())
            .chain(self.signed_in_as.iter().map(|e| e.len()))
            .max()
            .unwrap_or(0);
        let shortcut = if self.show_shortcuts { 3 } else { 0 };
        (longest + shortcut + 2).min(32) as u16
    }
}
