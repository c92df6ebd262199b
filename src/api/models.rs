use serde::{Deserialize, Serialize};

/// Identity kept on the client after a successful login.
///
/// There is no server-issued token: later calls identify the user with a
/// plain `X-User-Id` header carrying `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomCheckRequest {
    pub age: Option<u32>,
    pub temperature: Option<f64>,
    pub symptoms_text: String,
}

impl SymptomCheckRequest {
    /// Build a request from raw form input. Empty or non-numeric fields
    /// are sent as `null`.
    pub fn from_form(age: &str, temperature: &str, symptoms_text: &str) -> Self {
        Self {
            age: parse_age(age),
            temperature: temperature.trim().parse::<f64>().ok().filter(|t| t.is_finite()),
            symptoms_text: symptoms_text.to_string(),
        }
    }
}

/// Whole, non-negative ages only. `"34.0"` is accepted, while `"34.7"` and
/// values beyond `u32` become `None`.
fn parse_age(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|a| a.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(a))
            .map(|a| a as u32)
    })
}

/// Coarse triage category computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Lower-cased style class used when rendering the badge
    pub fn style_class(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymptomCheckResult {
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub advice: String,
    #[serde(default)]
    pub detected_flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A message in the in-memory chat transcript (never persisted client-side).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatHistoryEntry {
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymptomHistoryEntry {
    pub id: i64,
    pub created_at: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    pub symptoms_text: String,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub advice: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearbyHospitalsRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
}

/// A hospital returned by the backend. The list order carries no meaning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hospital {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub maps_url: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub open_now: Option<bool>,
}

/// Body of `GET /`
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    pub message: String,
}

/// `{ "detail": "..." }` error body used by the backend
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_fields_become_null_when_blank_or_invalid() {
        let req = SymptomCheckRequest::from_form("", "abc", "cough");
        assert_eq!(req.age, None);
        assert_eq!(req.temperature, None);
        assert_eq!(req.symptoms_text, "cough");

        let json = serde_json::to_value(&req).unwrap();
        assert!(json["age"].is_null());
        assert!(json["temperature"].is_null());
    }

    #[test]
    fn test_form_fields_parse_numbers() {
        let req = SymptomCheckRequest::from_form(" 34 ", "101.2", "fever and cough");
        assert_eq!(req.age, Some(34));
        assert_eq!(req.temperature, Some(101.2));
    }

    #[test]
    fn test_age_must_be_whole_and_in_range() {
        assert_eq!(SymptomCheckRequest::from_form("34.0", "", "x").age, Some(34));
        assert_eq!(SymptomCheckRequest::from_form("34.7", "", "x").age, None);
        assert_eq!(SymptomCheckRequest::from_form("-3", "", "x").age, None);
        assert_eq!(SymptomCheckRequest::from_form("99999999999", "", "x").age, None);
        assert_eq!(SymptomCheckRequest::from_form("1e20", "", "x").age, None);

        let json = serde_json::to_value(SymptomCheckRequest::from_form("34.7", "", "x")).unwrap();
        assert!(json["age"].is_null());
    }

    #[test]
    fn test_risk_level_style_class_is_lowercase_label() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(level.style_class(), level.label().to_lowercase());
        }
    }

    #[test]
    fn test_hospital_tolerates_extra_fields() {
        let raw = r#"{"name":"St Mary","address":"St Mary","lat":1.0,"lng":2.0,
            "place_id":"42","rating":null,"user_ratings_total":null,"open_now":null,
            "maps_url":"https://www.openstreetmap.org/?mlat=1&mlon=2"}"#;
        let hospital: Hospital = serde_json::from_str(raw).unwrap();
        assert_eq!(hospital.name, "St Mary");
        assert!(hospital.maps_url.is_some());
    }

    #[test]
    fn test_chat_history_entry_roles() {
        let raw = r#"[{"id":2,"created_at":"2025-01-01T00:00:00","role":"assistant","content":"hi"},
                      {"id":1,"created_at":"2025-01-01T00:00:00","role":"user","content":"hello"}]"#;
        let entries: Vec<ChatHistoryEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries[0].role, ChatRole::Assistant);
        assert_eq!(entries[1].role, ChatRole::User);
    }
}
