//! Pure state transitions
//!
//! `reduce` takes the current state and one action and returns the next
//! state plus the effects to run. It performs no I/O, which keeps every
//! UI rule testable without a terminal or a backend.

use tracing::debug;

use crate::api::{ChatMessage, Credentials, SymptomCheckRequest};
use crate::state::app_state::{AppState, AuthMode, RequestId, View};
use crate::state::events::{Action, Effect};

pub const MISSING_CREDENTIALS: &str = "Please enter your email and password.";
pub const SIGNUP_TOO_SHORT: &str = "Email too short or password less than 6 chars.";
pub const CHAT_HISTORY_LOGIN_REQUIRED: &str = "Please log in to view your chat history.";
pub const SYMPTOM_HISTORY_LOGIN_REQUIRED: &str = "Please log in to view your symptom history.";

pub fn reduce(mut state: AppState, action: Action) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::SwitchView(view) => switch_view(&mut state, view),
        Action::NextView => {
            let next = (state.view.index() + 1) % View::ALL.len();
            switch_view(&mut state, View::ALL[next]);
        }
        Action::PreviousView => {
            let count = View::ALL.len();
            let prev = (state.view.index() + count - 1) % count;
            switch_view(&mut state, View::ALL[prev]);
        }
        Action::FocusNext => {
            let count = state.fields().len();
            if count > 0 {
                state.focus = (state.focus + 1) % count;
            }
        }
        Action::FocusPrevious => {
            let count = state.fields().len();
            if count > 0 {
                state.focus = (state.focus + count - 1) % count;
            }
        }

        Action::InsertChar(c) => {
            if let Some(field) = state.focused_field() {
                state.field_value_mut(field).push(c);
            }
        }
        Action::Backspace => {
            if let Some(field) = state.focused_field() {
                state.field_value_mut(field).pop();
            }
        }
        Action::ClearField => {
            if let Some(field) = state.focused_field() {
                state.field_value_mut(field).clear();
            }
        }

        Action::Submit if state.view == View::History => {
            let (state, mut effects) = reduce(state, Action::LoadChatHistory);
            let (state, symptom_effects) = reduce(state, Action::LoadSymptomHistory);
            effects.extend(symptom_effects);
            return (state, effects);
        }
        Action::Submit => {
            let primary = match state.view {
                View::Home if !state.is_logged_in() => Some(Action::SubmitAuth),
                View::Home => None,
                View::Symptoms => Some(Action::SubmitSymptoms),
                View::Chat => Some(Action::SendChat),
                View::Hospitals => Some(Action::FindHospitals),
                View::History => None,
            };
            if let Some(primary) = primary {
                return reduce(state, primary);
            }
        }
        Action::ToggleAuthMode => {
            state.auth.mode = match state.auth.mode {
                AuthMode::Login => AuthMode::Signup,
                AuthMode::Signup => AuthMode::Login,
            };
            state.auth.error = None;
        }

        Action::SubmitAuth => submit_auth(&mut state, &mut effects),
        Action::SubmitSymptoms => submit_symptoms(&mut state, &mut effects),
        Action::SendChat => send_chat(&mut state, &mut effects),
        Action::FindHospitals => {
            let id = state.allocate_request_id();
            state.hospitals.error = None;
            state.hospitals.loading = true;
            state.hospitals.pending = Some(id);
            effects.push(Effect::FindHospitals { id });
        }
        Action::LoadChatHistory => match state.user_id() {
            None => {
                state.history.chat_error = Some(CHAT_HISTORY_LOGIN_REQUIRED.to_string());
            }
            Some(user_id) => {
                let id = state.allocate_request_id();
                state.history.chat_error = None;
                state.history.chat_loading = true;
                state.history.chat_pending = Some(id);
                effects.push(Effect::LoadChatHistory { id, user_id });
            }
        },
        Action::LoadSymptomHistory => match state.user_id() {
            None => {
                state.history.symptom_error = Some(SYMPTOM_HISTORY_LOGIN_REQUIRED.to_string());
            }
            Some(user_id) => {
                let id = state.allocate_request_id();
                state.history.symptom_error = None;
                state.history.symptom_loading = true;
                state.history.symptom_pending = Some(id);
                effects.push(Effect::LoadSymptomHistory { id, user_id });
            }
        },

        Action::Logout => {
            state.session = None;
            state.auth = Default::default();
            state.history = Default::default();
            switch_view(&mut state, View::Home);
            effects.push(Effect::ClearSession);
        }
        Action::ToggleLogPanel => state.show_logs = !state.show_logs,
        Action::Quit => state.should_quit = true,

        Action::AuthCompleted { id, outcome } => {
            if accept(&mut state.auth.pending, id, "auth") {
                state.auth.loading = false;
                match outcome {
                    Ok(session) => {
                        state.auth.password.clear();
                        state.auth.error = None;
                        state.session = Some(session.clone());
                        switch_view(&mut state, View::Symptoms);
                        effects.push(Effect::PersistSession(session));
                    }
                    Err(message) => state.auth.error = Some(message),
                }
            }
        }
        Action::SymptomCheckCompleted { id, outcome } => {
            if accept(&mut state.symptoms.pending, id, "symptom check") {
                state.symptoms.loading = false;
                match outcome {
                    Ok(result) => {
                        state.symptoms.result = Some(result);
                        state.symptoms.error = None;
                    }
                    Err(message) => {
                        state.symptoms.result = None;
                        state.symptoms.error = Some(message);
                    }
                }
            }
        }
        Action::ChatCompleted { id, outcome } => {
            if accept(&mut state.chat.pending, id, "chat") {
                state.chat.loading = false;
                match outcome {
                    Ok(reply) => state.chat.messages.push(ChatMessage::assistant(reply)),
                    Err(message) => state.chat.error = Some(message),
                }
            }
        }
        Action::ChatHistoryLoaded { id, outcome } => {
            if accept(&mut state.history.chat_pending, id, "chat history") {
                state.history.chat_loading = false;
                match outcome {
                    Ok(entries) => state.history.chat_entries = entries,
                    Err(message) => state.history.chat_error = Some(message),
                }
            }
        }
        Action::SymptomHistoryLoaded { id, outcome } => {
            if accept(&mut state.history.symptom_pending, id, "symptom history") {
                state.history.symptom_loading = false;
                match outcome {
                    Ok(entries) => state.history.symptom_entries = entries,
                    Err(message) => state.history.symptom_error = Some(message),
                }
            }
        }
        Action::HospitalsLoaded { id, outcome } => {
            if accept(&mut state.hospitals.pending, id, "hospitals") {
                state.hospitals.loading = false;
                state.hospitals.searched = true;
                match outcome {
                    Ok(hospitals) => state.hospitals.hospitals = hospitals,
                    Err(message) => {
                        state.hospitals.hospitals.clear();
                        state.hospitals.error = Some(message);
                    }
                }
            }
        }
    }

    (state, effects)
}

fn switch_view(state: &mut AppState, view: View) {
    state.view = view;
    state.focus = 0;
}

/// Clear the pending slot if `id` is the request it holds. Completions of
/// superseded or abandoned requests are dropped.
fn accept(pending: &mut Option<RequestId>, id: RequestId, what: &str) -> bool {
    if *pending == Some(id) {
        *pending = None;
        true
    } else {
        debug!(target: "state", "Discarding stale {} completion {:?}", what, id);
        false
    }
}

fn submit_auth(state: &mut AppState, effects: &mut Vec<Effect>) {
    if state.auth.loading || state.is_logged_in() {
        return;
    }

    let credentials =
        match validate_credentials(state.auth.mode, &state.auth.email, &state.auth.password) {
            Ok(credentials) => credentials,
            Err(message) => {
                state.auth.error = Some(message.to_string());
                return;
            }
        };

    let id = state.allocate_request_id();
    state.auth.error = None;
    state.auth.loading = true;
    state.auth.pending = Some(id);
    effects.push(Effect::Authenticate {
        id,
        mode: state.auth.mode,
        credentials,
    });
}

/// Check form input before it is sent. Signup additionally needs an email
/// longer than five characters and a password of at least six.
pub fn validate_credentials(
    mode: AuthMode,
    email: &str,
    password: &str,
) -> Result<Credentials, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_CREDENTIALS);
    }
    if mode == AuthMode::Signup && (email.len() <= 5 || password.len() < 6) {
        return Err(SIGNUP_TOO_SHORT);
    }
    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

fn submit_symptoms(state: &mut AppState, effects: &mut Vec<Effect>) {
    if state.symptoms.loading || state.symptoms.symptoms_text.trim().is_empty() {
        return;
    }

    let request = SymptomCheckRequest::from_form(
        &state.symptoms.age,
        &state.symptoms.temperature,
        &state.symptoms.symptoms_text,
    );
    let id = state.allocate_request_id();
    state.symptoms.error = None;
    state.symptoms.loading = true;
    state.symptoms.pending = Some(id);
    effects.push(Effect::CheckSymptoms {
        id,
        request,
        user_id: state.user_id(),
    });
}

fn send_chat(state: &mut AppState, effects: &mut Vec<Effect>) {
    let text = state.chat.input.trim().to_string();
    if text.is_empty() || state.chat.loading {
        return;
    }

    state.chat.error = None;
    state.chat.messages.push(ChatMessage::user(text.clone()));
    state.chat.input.clear();

    let id = state.allocate_request_id();
    state.chat.loading = true;
    state.chat.pending = Some(id);
    effects.push(Effect::SendChat {
        id,
        text,
        user_id: state.user_id(),
    });
}
