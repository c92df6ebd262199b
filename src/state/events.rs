//! Actions fed into the reducer and the effects it asks for

use crate::api::{
    ChatHistoryEntry, Credentials, Hospital, Session, SymptomCheckRequest, SymptomCheckResult,
    SymptomHistoryEntry,
};
use crate::state::app_state::{AuthMode, RequestId, View};

/// Outcome of a request as seen by the UI: a value or one display message
pub type Outcome<T> = Result<T, String>;

/// Everything that can change the application state
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Navigation
    SwitchView(View),
    NextView,
    PreviousView,
    FocusNext,
    FocusPrevious,

    // Editing the focused field
    InsertChar(char),
    Backspace,
    ClearField,

    /// Enter: the primary action of the current view
    Submit,
    ToggleAuthMode,

    // Requests
    SubmitAuth,
    SubmitSymptoms,
    SendChat,
    FindHospitals,
    LoadChatHistory,
    LoadSymptomHistory,

    // Session and application control
    Logout,
    ToggleLogPanel,
    Quit,

    // Request completions
    AuthCompleted {
        id: RequestId,
        outcome: Outcome<Session>,
    },
    SymptomCheckCompleted {
        id: RequestId,
        outcome: Outcome<SymptomCheckResult>,
    },
    ChatCompleted {
        id: RequestId,
        outcome: Outcome<String>,
    },
    ChatHistoryLoaded {
        id: RequestId,
        outcome: Outcome<Vec<ChatHistoryEntry>>,
    },
    SymptomHistoryLoaded {
        id: RequestId,
        outcome: Outcome<Vec<SymptomHistoryEntry>>,
    },
    HospitalsLoaded {
        id: RequestId,
        outcome: Outcome<Vec<Hospital>>,
    },
}

/// Work requested by the reducer, carried out by the request service
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Authenticate {
        id: RequestId,
        mode: AuthMode,
        credentials: Credentials,
    },
    CheckSymptoms {
        id: RequestId,
        request: SymptomCheckRequest,
        user_id: Option<i64>,
    },
    SendChat {
        id: RequestId,
        text: String,
        user_id: Option<i64>,
    },
    LoadChatHistory {
        id: RequestId,
        user_id: i64,
    },
    LoadSymptomHistory {
        id: RequestId,
        user_id: i64,
    },
    FindHospitals {
        id: RequestId,
    },
    PersistSession(Session),
    ClearSession,
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Authenticate { .. } => "Authenticate",
            Effect::CheckSymptoms { .. } => "CheckSymptoms",
            Effect::SendChat { .. } => "SendChat",
            Effect::LoadChatHistory { .. } => "LoadChatHistory",
            Effect::LoadSymptomHistory { .. } => "LoadSymptomHistory",
            Effect::FindHospitals { .. } => "FindHospitals",
            Effect::PersistSession(_) => "PersistSession",
            Effect::ClearSession => "ClearSession",
        }
    }
}
