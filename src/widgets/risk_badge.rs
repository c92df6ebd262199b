use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

use crate::api::{RiskLevel, SymptomCheckResult};

/// Colour for a risk style class. Unknown classes render plain.
pub fn style_for_class(class: &str) -> Style {
    let color = match class {
        "low" => Color::Green,
        "medium" => Color::Yellow,
        "high" => Color::Red,
        _ => return Style::default(),
    };
    Style::default()
        .fg(Color::Black)
        .bg(color)
        .add_modifier(Modifier::BOLD)
}

pub fn risk_badge(level: RiskLevel) -> Span<'static> {
    Span::styled(
        format!(" {} risk ", level.label().to_uppercase()),
        style_for_class(level.style_class()),
    )
}

/// One list item per detected flag, in the order the backend sent them
pub fn flag_items(flags: &[String]) -> Vec<ListItem<'static>> {
    flag_labels(flags)
        .into_iter()
        .map(|label| ListItem::new(Line::from(label)))
        .collect()
}

fn flag_labels(flags: &[String]) -> Vec<String> {
    flags.iter().map(|flag| format!("• {}", flag)).collect()
}

/// Badge, score and advice lines for a result
pub fn summary_lines(result: &SymptomCheckResult) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            risk_badge(result.risk_level),
            Span::raw(format!("  score {}/100", result.risk_score)),
        ]),
        Line::from(""),
        Line::from(result.advice.clone()),
    ]
}
