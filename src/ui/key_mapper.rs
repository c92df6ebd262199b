// Maps keyboard input to reducer actions

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::HashMap;

use crate::state::{Action, AppState, View};

/// Maps keys to actions given the current state.
///
/// Global bindings work everywhere. Printable characters go to the focused
/// field, and views without fields give a few letters their own meaning.
pub struct KeyMapper {
    global_mappings: HashMap<(KeyCode, KeyModifiers), Action>,
}

impl KeyMapper {
    pub fn new() -> Self {
        let mut mapper = Self {
            global_mappings: HashMap::new(),
        };
        mapper.init_global_mappings();
        mapper
    }

    fn init_global_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        for (i, view) in View::ALL.iter().enumerate() {
            self.global_mappings
                .insert((F(i as u8 + 1), Mod::NONE), Action::SwitchView(*view));
            let digit = char::from(b'1' + i as u8);
            self.global_mappings
                .insert((Char(digit), Mod::ALT), Action::SwitchView(*view));
        }

        self.global_mappings
            .insert((F(6), Mod::NONE), Action::ToggleLogPanel);

        self.global_mappings
            .insert((Right, Mod::CONTROL), Action::NextView);
        self.global_mappings
            .insert((Left, Mod::CONTROL), Action::PreviousView);

        self.global_mappings.insert((Tab, Mod::NONE), Action::FocusNext);
        self.global_mappings
            .insert((BackTab, Mod::SHIFT), Action::FocusPrevious);
        self.global_mappings
            .insert((BackTab, Mod::NONE), Action::FocusPrevious);

        self.global_mappings.insert((Enter, Mod::NONE), Action::Submit);
        self.global_mappings
            .insert((Backspace, Mod::NONE), Action::Backspace);
        self.global_mappings.insert((Esc, Mod::NONE), Action::ClearField);

        self.global_mappings
            .insert((Char('t'), Mod::CONTROL), Action::ToggleAuthMode);
        self.global_mappings
            .insert((Char('l'), Mod::CONTROL), Action::Logout);
        self.global_mappings
            .insert((Char('q'), Mod::CONTROL), Action::Quit);
        self.global_mappings
            .insert((Char('c'), Mod::CONTROL), Action::Quit);
    }

    pub fn map_key(&self, key: KeyEvent, state: &AppState) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if let Some(action) = self.global_mappings.get(&(key.code, key.modifiers)) {
            return Some(action.clone());
        }

        let KeyCode::Char(c) = key.code else {
            return None;
        };
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }

        if state.focused_field().is_some() {
            return Some(Action::InsertChar(c));
        }

        match (state.view, c) {
            (View::Hospitals, 'f') => Some(Action::FindHospitals),
            (View::History, 'c') => Some(Action::LoadChatHistory),
            (View::History, 's') => Some(Action::LoadSymptomHistory),
            (_, 'q') => Some(Action::Quit),
            _ => None,
        }
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}
