use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::api::{ChatHistoryEntry, Hospital, RiskLevel, SymptomCheckResult, SymptomHistoryEntry};

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn risk_cell(level: RiskLevel) -> Cell {
    let color = match level {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::Red,
    };
    Cell::new(level.label())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn symptom_result_table(result: &SymptomCheckResult) -> Table {
    let mut table = new_table(&["Risk", "Score", "Advice"]);
    table.add_row(vec![
        risk_cell(result.risk_level),
        Cell::new(format!("{}/100", result.risk_score)),
        Cell::new(&result.advice),
    ]);
    table
}

pub fn hospitals_table(hospitals: &[Hospital]) -> Table {
    let mut table = new_table(&["Name", "Address", "Rating", "Open", "Map"]);
    for h in hospitals {
        table.add_row(vec![
            h.name.clone(),
            h.address.clone(),
            optional(h.rating),
            match h.open_now {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => String::new(),
            },
            h.maps_url.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn chat_history_table(entries: &[ChatHistoryEntry]) -> Table {
    let mut table = new_table(&["When", "Role", "Message"]);
    for entry in entries {
        table.add_row(vec![
            entry.created_at.clone(),
            entry.role.as_str().to_string(),
            entry.content.clone(),
        ]);
    }
    table
}

pub fn symptom_history_table(entries: &[SymptomHistoryEntry]) -> Table {
    let mut table = new_table(&["When", "Symptoms", "Age", "Temp", "Risk", "Score", "Advice"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.created_at),
            Cell::new(&entry.symptoms_text),
            Cell::new(optional(entry.age)),
            Cell::new(optional(entry.temperature)),
            risk_cell(entry.risk_level),
            Cell::new(entry.risk_score),
            Cell::new(&entry.advice),
        ]);
    }
    table
}

pub fn display_symptom_result(result: &SymptomCheckResult) {
    println!("{}", symptom_result_table(result));
    if !result.detected_flags.is_empty() {
        println!("\n{}", "Detected flags:".yellow());
        for flag in &result.detected_flags {
            println!("  • {}", flag);
        }
    }
}

pub fn display_hospitals(hospitals: &[Hospital]) {
    if hospitals.is_empty() {
        println!("{}", "No hospitals found nearby.".yellow());
        return;
    }
    println!("{}", hospitals_table(hospitals));
    println!("\n{}", format!("{} hospitals found", hospitals.len()).green());
}

pub fn display_chat_history(entries: &[ChatHistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No saved chats yet.".yellow());
        return;
    }
    println!("{}", chat_history_table(entries));
}

pub fn display_symptom_history(entries: &[SymptomHistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No saved symptom checks yet.".yellow());
        return;
    }
    println!("{}", symptom_history_table(entries));
}
