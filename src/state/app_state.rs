use crate::api::{
    ChatHistoryEntry, ChatMessage, Hospital, Session, SymptomCheckResult, SymptomHistoryEntry,
};

pub const CHAT_GREETING: &str = "Hi, I'm your SafeLink AI helper. I can give general health and \
safety information, but I'm not a doctor. How are you feeling today?";

pub const LOGIN_REMINDER: &str = "Please sign in on the Home page to use this feature.";

/// Identifies one request so its completion can be matched to the
/// request that is still wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Symptoms,
    Chat,
    Hospitals,
    History,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Home,
        View::Symptoms,
        View::Chat,
        View::Hospitals,
        View::History,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Symptoms => "Symptom Checker",
            View::Chat => "AI Chat",
            View::Hospitals => "Nearby Hospitals",
            View::History => "My History",
        }
    }

    pub fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        View::ALL.get(index).copied()
    }

    /// Editable fields of this view, in focus order
    pub fn fields(&self, logged_in: bool) -> &'static [Field] {
        match self {
            View::Home if !logged_in => &[Field::Email, Field::Password],
            View::Symptoms => &[Field::Age, Field::Temperature, Field::Symptoms],
            View::Chat => &[Field::ChatInput],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    Age,
    Temperature,
    Symptoms,
    ChatInput,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Age => "Age",
            Field::Temperature => "Temperature (°F)",
            Field::Symptoms => "Describe your symptoms *",
            Field::ChatInput => "Message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub loading: bool,
    pub error: Option<String>,
    pub pending: Option<RequestId>,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            email: String::new(),
            password: String::new(),
            loading: false,
            error: None,
            pending: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomForm {
    pub age: String,
    pub temperature: String,
    pub symptoms_text: String,
    pub loading: bool,
    pub result: Option<SymptomCheckResult>,
    pub error: Option<String>,
    pub pending: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatPanel {
    pub input: String,
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
    pub error: Option<String>,
    pub pending: Option<RequestId>,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self {
            input: String::new(),
            messages: vec![ChatMessage::assistant(CHAT_GREETING)],
            loading: false,
            error: None,
            pending: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HospitalPanel {
    pub hospitals: Vec<Hospital>,
    pub loading: bool,
    pub error: Option<String>,
    pub pending: Option<RequestId>,
    pub searched: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPanel {
    pub chat_entries: Vec<ChatHistoryEntry>,
    pub chat_loading: bool,
    pub chat_error: Option<String>,
    pub chat_pending: Option<RequestId>,
    pub symptom_entries: Vec<SymptomHistoryEntry>,
    pub symptom_loading: bool,
    pub symptom_error: Option<String>,
    pub symptom_pending: Option<RequestId>,
}

/// Whole UI state. Only `reduce` changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub session: Option<Session>,
    pub view: View,
    /// Index into the current view's fields
    pub focus: usize,
    pub auth: AuthForm,
    pub symptoms: SymptomForm,
    pub chat: ChatPanel,
    pub hospitals: HospitalPanel,
    pub history: HistoryPanel,
    pub show_logs: bool,
    pub should_quit: bool,
    next_request_id: u64,
}

impl AppState {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session,
            view: View::Home,
            focus: 0,
            auth: AuthForm::default(),
            symptoms: SymptomForm::default(),
            chat: ChatPanel::default(),
            hospitals: HospitalPanel::default(),
            history: HistoryPanel::default(),
            show_logs: false,
            should_quit: false,
            next_request_id: 1,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.session.as_ref().map(|s| s.user_id)
    }

    pub fn fields(&self) -> &'static [Field] {
        self.view.fields(self.is_logged_in())
    }

    pub fn focused_field(&self) -> Option<Field> {
        self.fields().get(self.focus).copied()
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Email => &self.auth.email,
            Field::Password => &self.auth.password,
            Field::Age => &self.symptoms.age,
            Field::Temperature => &self.symptoms.temperature,
            Field::Symptoms => &self.symptoms.symptoms_text,
            Field::ChatInput => &self.chat.input,
        }
    }

    pub(crate) fn field_value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Email => &mut self.auth.email,
            Field::Password => &mut self.auth.password,
            Field::Age => &mut self.symptoms.age,
            Field::Temperature => &mut self.symptoms.temperature,
            Field::Symptoms => &mut self.symptoms.symptoms_text,
            Field::ChatInput => &mut self.chat.input,
        }
    }

    /// Reminder shown on views that save data only for signed-in users
    pub fn login_reminder(&self) -> Option<&'static str> {
        match self.view {
            View::Symptoms | View::Chat | View::History if !self.is_logged_in() => {
                Some(LOGIN_REMINDER)
            }
            _ => None,
        }
    }

    /// Number of requests currently in flight
    pub fn in_flight(&self) -> usize {
        [
            self.auth.pending,
            self.symptoms.pending,
            self.chat.pending,
            self.hospitals.pending,
            self.history.chat_pending,
            self.history.symptom_pending,
        ]
        .iter()
        .filter(|p| p.is_some())
        .count()
    }

    pub(crate) fn allocate_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}
