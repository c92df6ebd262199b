use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::api::{HealthApi, Operation};
use crate::location::LocationProvider;
use crate::session_store::SessionStore;
use crate::state::{Action, AuthMode, Effect};

/// Runs the effects produced by the reducer.
///
/// Each request runs on its own tokio task so the UI keeps drawing while
/// it waits. Completions come back as `Action`s on `completions`, tagged
/// with the id of the request that produced them.
pub struct RequestService {
    api: Arc<dyn HealthApi>,
    location: Arc<dyn LocationProvider>,
    sessions: Option<SessionStore>,
    completions: UnboundedSender<Action>,
    hospital_radius_meters: u32,
}

impl RequestService {
    pub fn new(
        api: Arc<dyn HealthApi>,
        location: Arc<dyn LocationProvider>,
        completions: UnboundedSender<Action>,
        hospital_radius_meters: u32,
    ) -> Self {
        Self {
            api,
            location,
            sessions: None,
            completions,
            hospital_radius_meters,
        }
    }

    /// Persist logins to `store`. Without a store the session only lives
    /// for this run.
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.sessions = Some(store);
        self
    }

    pub fn run_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run(effect);
        }
    }

    pub fn run(&self, effect: Effect) {
        debug!(target: "requests", "Running effect {}", effect.name());

        match effect {
            Effect::PersistSession(session) => {
                if let Some(store) = &self.sessions {
                    if let Err(e) = store.save_session(&session) {
                        warn!("Failed to save session: {}", e);
                    }
                }
            }
            Effect::ClearSession => {
                if let Some(store) = &self.sessions {
                    if let Err(e) = store.clear_session() {
                        warn!("Failed to clear saved session: {}", e);
                    }
                }
            }
            Effect::Authenticate {
                id,
                mode,
                credentials,
            } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let (result, op) = match mode {
                        AuthMode::Login => (api.login(&credentials).await, Operation::Login),
                        AuthMode::Signup => (api.signup(&credentials).await, Operation::Signup),
                    };
                    if let Ok(session) = &result {
                        info!("Signed in as user {}", session.user_id);
                    }
                    Action::AuthCompleted {
                        id,
                        outcome: result.map_err(|e| describe_failure(e, op)),
                    }
                });
            }
            Effect::CheckSymptoms {
                id,
                request,
                user_id,
            } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let outcome = api
                        .check_symptoms(&request, user_id)
                        .await
                        .map_err(|e| describe_failure(e, Operation::SymptomCheck));
                    Action::SymptomCheckCompleted { id, outcome }
                });
            }
            Effect::SendChat { id, text, user_id } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let outcome = api
                        .send_chat_message(&text, user_id)
                        .await
                        .map_err(|e| describe_failure(e, Operation::Chat));
                    Action::ChatCompleted { id, outcome }
                });
            }
            Effect::LoadChatHistory { id, user_id } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let outcome = api
                        .load_chat_history(Some(user_id))
                        .await
                        .map_err(|e| describe_failure(e, Operation::ChatHistory));
                    Action::ChatHistoryLoaded { id, outcome }
                });
            }
            Effect::LoadSymptomHistory { id, user_id } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let outcome = api
                        .load_symptom_history(Some(user_id))
                        .await
                        .map_err(|e| describe_failure(e, Operation::SymptomHistory));
                    Action::SymptomHistoryLoaded { id, outcome }
                });
            }
            Effect::FindHospitals { id } => {
                let api = Arc::clone(&self.api);
                let location = Arc::clone(&self.location);
                let radius = self.hospital_radius_meters;
                self.spawn(async move {
                    let outcome = match location.current_position().await {
                        Ok(coords) => api
                            .find_nearby_hospitals(coords, radius)
                            .await
                            .map_err(|e| describe_failure(e, Operation::NearbyHospitals)),
                        Err(e) => {
                            info!("No position for hospital search: {}", e);
                            Err(e.user_message())
                        }
                    };
                    Action::HospitalsLoaded { id, outcome }
                });
            }
        }
    }

    fn spawn<F>(&self, request: F)
    where
        F: std::future::Future<Output = Action> + Send + 'static,
    {
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let action = request.await;
            if completions.send(action).is_err() {
                debug!(target: "requests", "UI closed before request completed");
            }
        });
    }
}

fn describe_failure(error: crate::api::ApiError, op: Operation) -> String {
    warn!("{:?} failed: {}", op, error);
    error.user_message(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ApiError, ApiResult, BackendStatus, ChatHistoryEntry, Credentials, Hospital, Session,
        SymptomCheckRequest, SymptomCheckResult, SymptomHistoryEntry,
    };
    use crate::location::{Coordinates, DisabledLocation, FixedLocation, NoLocation};
    use crate::state::RequestId;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        chat: Option<ApiError>,
    }

    impl FakeApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HealthApi for FakeApi {
        async fn check_symptoms(
            &self,
            request: &SymptomCheckRequest,
            _user_id: Option<i64>,
        ) -> ApiResult<SymptomCheckResult> {
            self.record(format!("check:{}", request.symptoms_text));
            Err(ApiError::Http {
                status: 500,
                detail: Some("boom".to_string()),
            })
        }

        async fn send_chat_message(&self, text: &str, _user_id: Option<i64>) -> ApiResult<String> {
            self.record(format!("chat:{}", text));
            match &self.chat {
                Some(ApiError::Timeout(d)) => Err(ApiError::Timeout(*d)),
                Some(_) => Err(ApiError::Network("down".to_string())),
                None => Ok(format!("echo {}", text)),
            }
        }

        async fn load_chat_history(&self, user_id: Option<i64>) -> ApiResult<Vec<ChatHistoryEntry>> {
            self.record(format!("chat-history:{:?}", user_id));
            Ok(vec![])
        }

        async fn load_symptom_history(
            &self,
            user_id: Option<i64>,
        ) -> ApiResult<Vec<SymptomHistoryEntry>> {
            self.record(format!("symptom-history:{:?}", user_id));
            Ok(vec![])
        }

        async fn find_nearby_hospitals(
            &self,
            at: Coordinates,
            radius_meters: u32,
        ) -> ApiResult<Vec<Hospital>> {
            self.record(format!(
                "hospitals:{},{}:{}",
                at.latitude, at.longitude, radius_meters
            ));
            Ok(vec![Hospital {
                name: "Korle Bu".to_string(),
                address: "Korle Bu".to_string(),
                maps_url: None,
                lat: None,
                lng: None,
                rating: None,
                open_now: None,
            }])
        }

        async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
            self.record(format!("login:{}", credentials.email));
            Ok(Session {
                user_id: 7,
                email: credentials.email.clone(),
            })
        }

        async fn signup(&self, credentials: &Credentials) -> ApiResult<Session> {
            self.record(format!("signup:{}", credentials.email));
            Err(ApiError::Http {
                status: 400,
                detail: Some("Email already registered".to_string()),
            })
        }

        async fn backend_status(&self) -> ApiResult<BackendStatus> {
            Ok(BackendStatus {
                message: "ok".to_string(),
            })
        }
    }

    async fn run_one(
        api: Arc<FakeApi>,
        location: Arc<dyn LocationProvider>,
        effect: Effect,
    ) -> Action {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = RequestService::new(api, location, tx, 5_000);
        service.run(effect);
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("completion in time")
            .expect("completion sent")
    }

    #[tokio::test]
    async fn test_denied_location_makes_no_api_call() {
        let api = Arc::new(FakeApi::default());
        let action = run_one(
            api.clone(),
            Arc::new(DisabledLocation),
            Effect::FindHospitals { id: RequestId(3) },
        )
        .await;

        assert_eq!(
            action,
            Action::HospitalsLoaded {
                id: RequestId(3),
                outcome: Err("Please allow location access to find nearby care.".to_string()),
            }
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_location_message() {
        let api = Arc::new(FakeApi::default());
        let action = run_one(
            api.clone(),
            Arc::new(NoLocation),
            Effect::FindHospitals { id: RequestId(1) },
        )
        .await;
        match action {
            Action::HospitalsLoaded { outcome: Err(msg), .. } => {
                assert_eq!(msg, "Location access is not supported on this device.")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_hospitals_use_position_and_radius() {
        let api = Arc::new(FakeApi::default());
        let action = run_one(
            api.clone(),
            Arc::new(FixedLocation::new(Coordinates::new(5.6, -0.2))),
            Effect::FindHospitals { id: RequestId(2) },
        )
        .await;
        assert!(matches!(action, Action::HospitalsLoaded { outcome: Ok(ref list), .. } if list.len() == 1));
        assert_eq!(api.calls(), vec!["hospitals:5.6,-0.2:5000".to_string()]);
    }

    #[tokio::test]
    async fn test_symptom_failure_uses_generic_message() {
        let api = Arc::new(FakeApi::default());
        let action = run_one(
            api,
            Arc::new(NoLocation),
            Effect::CheckSymptoms {
                id: RequestId(4),
                request: SymptomCheckRequest::from_form("", "", "cough"),
                user_id: None,
            },
        )
        .await;
        assert_eq!(
            action,
            Action::SymptomCheckCompleted {
                id: RequestId(4),
                outcome: Err(
                    "Failed to get result. Please check your connection or try again shortly."
                        .to_string()
                ),
            }
        );
    }

    #[tokio::test]
    async fn test_chat_timeout_message() {
        let api = Arc::new(FakeApi {
            chat: Some(ApiError::Timeout(Duration::from_secs(30))),
            ..Default::default()
        });
        let action = run_one(
            api,
            Arc::new(NoLocation),
            Effect::SendChat {
                id: RequestId(5),
                text: "hello".to_string(),
                user_id: Some(7),
            },
        )
        .await;
        match action {
            Action::ChatCompleted { outcome: Err(msg), .. } => {
                assert!(msg.starts_with("Request timed out (30s limit reached)"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signup_detail_is_shown() {
        let api = Arc::new(FakeApi::default());
        let action = run_one(
            api,
            Arc::new(NoLocation),
            Effect::Authenticate {
                id: RequestId(6),
                mode: AuthMode::Signup,
                credentials: Credentials {
                    email: "kofi@example.com".to_string(),
                    password: "secret1".to_string(),
                },
            },
        )
        .await;
        assert_eq!(
            action,
            Action::AuthCompleted {
                id: RequestId(6),
                outcome: Err("Email already registered".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_session_effects_use_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_file(dir.path().join("storage.json"));
        let (tx, _rx) = mpsc::unbounded_channel();
        let service = RequestService::new(Arc::new(FakeApi::default()), Arc::new(NoLocation), tx, 1)
            .with_session_store(store.clone());

        let session = Session {
            user_id: 42,
            email: "ama@example.com".to_string(),
        };
        service.run(Effect::PersistSession(session.clone()));
        assert_eq!(store.load_session(), Some(session));

        service.run(Effect::ClearSession);
        assert_eq!(store.load_session(), None);
    }
}
