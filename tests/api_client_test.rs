use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use safelink_cli::api::{
    ApiClient, ApiError, ChatRole, Credentials, HealthApi, Operation, RiskLevel,
    SymptomCheckRequest, EMPTY_REPLY_PLACEHOLDER,
};
use safelink_cli::location::Coordinates;

/// Requests seen by the test backend: (path, X-User-Id, body)
type Seen = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

fn user_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn symptom_check(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    seen.lock()
        .unwrap()
        .push(("/api/symptom-check".into(), user_header(&headers), body.clone()));
    match body["symptoms_text"].as_str().unwrap_or_default() {
        "explode" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "model crashed"})),
        )
            .into_response(),
        "garbled" => (StatusCode::OK, "<html>upstream proxy page</html>").into_response(),
        "misshapen" => (StatusCode::OK, Json(json!({"status": "queued"}))).into_response(),
        _ => Json(json!({
            "risk_level": "High",
            "risk_score": 85,
            "advice": "Seek emergency care now.",
            "detected_flags": ["chest_pain", "elderly_high_fever"]
        }))
        .into_response(),
    }
}

async fn chat(Json(body): Json<Value>) -> Response {
    match body["message"].as_str().unwrap_or_default() {
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"reply": "too late"})).into_response()
        }
        "empty" => Json(json!({"reply": ""})).into_response(),
        "broken" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"detail": "AI service is temporarily unavailable."})),
        )
            .into_response(),
        "bare" => (StatusCode::BAD_GATEWAY, Json(json!({}))).into_response(),
        "garbled" => (StatusCode::OK, "Service starting, please wait").into_response(),
        _ => Json(json!({"reply": "Rest and drink water."})).into_response(),
    }
}

async fn chat_history(State(seen): State<Seen>, headers: HeaderMap) -> Json<Value> {
    let user = user_header(&headers);
    seen.lock()
        .unwrap()
        .push(("/api/chat-history".into(), user, Value::Null));
    Json(json!([
        {"id": 2, "created_at": "2025-05-01T10:00:05", "role": "assistant", "content": "Rest."},
        {"id": 1, "created_at": "2025-05-01T10:00:00", "role": "user", "content": "I have a headache"}
    ]))
}

async fn symptom_history(State(seen): State<Seen>, headers: HeaderMap) -> Response {
    let user = user_header(&headers);
    seen.lock()
        .unwrap()
        .push(("/api/symptom-history".into(), user.clone(), Value::Null));
    if user.as_deref() == Some("404") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "User not found."})),
        )
            .into_response();
    }
    Json(json!([
        {"id": 9, "created_at": "2025-05-02T08:30:00", "age": 70, "temperature": 102.5,
         "symptoms_text": "chest pain and fever", "risk_level": "High", "risk_score": 85,
         "advice": "Seek emergency care now."},
        {"id": 4, "created_at": "2025-04-28T19:10:00", "age": null, "temperature": null,
         "symptoms_text": "mild cough", "risk_level": "Low", "risk_score": 10,
         "advice": "Rest and monitor your symptoms."}
    ]))
    .into_response()
}

async fn hospitals(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock()
        .unwrap()
        .push(("/api/nearby-hospitals".into(), None, body));
    Json(json!([
        {"name": "Korle Bu Teaching Hospital", "address": "Korle Bu Teaching Hospital",
         "lat": 5.536, "lng": -0.227, "place_id": "n1", "rating": null,
         "user_ratings_total": null, "open_now": null,
         "maps_url": "https://www.openstreetmap.org/?mlat=5.536&mlon=-0.227#map=18/5.536/-0.227"}
    ]))
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret1" {
        (
            StatusCode::OK,
            Json(json!({"user_id": 12, "email": body["email"]})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid email or password."})),
        )
    }
}

async fn signup() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}]})),
    )
}

async fn root() -> Json<Value> {
    Json(json!({"message": "SafeLink AI Backend is running"}))
}

async fn spawn_backend() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/", get(root))
        .route("/api/symptom-check", post(symptom_check))
        .route("/api/chat", post(chat))
        .route("/api/chat-history", get(chat_history))
        .route("/api/symptom-history", get(symptom_history))
        .route("/api/nearby-hospitals", post(hospitals))
        .route("/api/login", post(login))
        .route("/api/signup", post(signup))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

#[tokio::test]
async fn symptom_check_success_and_identity_header() {
    let (base, seen) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let request = SymptomCheckRequest::from_form("70", "102.5", "chest pain and fever");
    let result = client.check_symptoms(&request, Some(12)).await.unwrap();
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.risk_level.style_class(), "high");
    assert_eq!(result.risk_score, 85);
    assert_eq!(result.detected_flags, vec!["chest_pain", "elderly_high_fever"]);

    let seen = seen.lock().unwrap();
    let (path, user, body) = &seen[0];
    assert_eq!(path, "/api/symptom-check");
    assert_eq!(user.as_deref(), Some("12"));
    assert_eq!(body["age"], 70);
    assert_eq!(body["temperature"], 102.5);
}

#[tokio::test]
async fn symptom_check_error_uses_generic_message() {
    let (base, seen) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let request = SymptomCheckRequest::from_form("", "", "explode");
    let err = client.check_symptoms(&request, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 500, .. }));
    assert_eq!(
        err.user_message(Operation::SymptomCheck),
        "Failed to get result. Please check your connection or try again shortly."
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].1, None);
    assert!(seen[0].2["age"].is_null());
}

#[tokio::test]
async fn symptom_check_malformed_body_is_decode_error() {
    let (base, _) = spawn_backend().await;
    let client = ApiClient::new(&base);

    for text in ["garbled", "misshapen"] {
        let request = SymptomCheckRequest::from_form("30", "", text);
        let err = client.check_symptoms(&request, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "{}: {:?}", text, err);
        assert_eq!(
            err.user_message(Operation::SymptomCheck),
            "Failed to get result. Please check your connection or try again shortly."
        );
    }
}

#[tokio::test]
async fn chat_reply_and_error_messages() {
    let (base, _) = spawn_backend().await;
    let client = ApiClient::new(&base);

    assert_eq!(
        client.send_chat_message("I have a headache", None).await.unwrap(),
        "Rest and drink water."
    );

    let err = client.send_chat_message("broken", None).await.unwrap_err();
    assert_eq!(
        err.user_message(Operation::Chat),
        "AI service is temporarily unavailable."
    );

    let err = client.send_chat_message("bare", None).await.unwrap_err();
    assert_eq!(
        err.user_message(Operation::Chat),
        "Chat API returned status 502."
    );
}

#[tokio::test]
async fn chat_empty_reply_is_substituted() {
    let (base, _) = spawn_backend().await;
    let client = ApiClient::new(&base);
    assert_eq!(
        client.send_chat_message("empty", None).await.unwrap(),
        EMPTY_REPLY_PLACEHOLDER
    );
}

#[tokio::test]
async fn chat_non_json_body_is_decode_error() {
    let (base, _) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let err = client.send_chat_message("garbled", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert!(!err.is_timeout());
    assert_eq!(
        err.user_message(Operation::Chat),
        "Network error. Check if the server is reachable and try again."
    );
}

#[tokio::test]
async fn chat_times_out() {
    let (base, _) = spawn_backend().await;
    let client = ApiClient::new(&base).with_chat_timeout(Duration::from_millis(200));

    let started = std::time::Instant::now();
    let err = client.send_chat_message("slow", None).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(
        err.user_message(Operation::Chat),
        "Request timed out (30s limit reached). The AI model is taking too long to respond."
    );
}

#[tokio::test]
async fn chat_network_failure() {
    // Nothing listens on the discard port
    let client = ApiClient::new("http://127.0.0.1:9");
    let err = client.send_chat_message("hello", None).await.unwrap_err();
    assert_eq!(
        err.user_message(Operation::Chat),
        "Network error. Check if the server is reachable and try again."
    );
}

#[tokio::test]
async fn chat_history_sends_user_header() {
    let (base, seen) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let entries = client.load_chat_history(Some(12)).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].role, ChatRole::Assistant);
    assert_eq!(entries[1].content, "I have a headache");

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "/api/chat-history");
    assert_eq!(seen[0].1.as_deref(), Some("12"));
}

#[tokio::test]
async fn symptom_history_sends_user_header() {
    let (base, seen) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let entries = client.load_symptom_history(Some(12)).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].risk_level, RiskLevel::High);
    assert_eq!(entries[0].age, Some(70));
    assert_eq!(entries[0].temperature, Some(102.5));
    assert_eq!(entries[1].risk_level, RiskLevel::Low);
    assert_eq!(entries[1].age, None);
    assert_eq!(entries[1].temperature, None);
    assert_eq!(entries[1].symptoms_text, "mild cough");

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "/api/symptom-history");
    assert_eq!(seen[0].1.as_deref(), Some("12"));
}

#[tokio::test]
async fn symptom_history_errors() {
    let (base, seen) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let err = client.load_symptom_history(Some(404)).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
    assert_eq!(err.user_message(Operation::SymptomHistory), "User not found.");

    let err = client.load_symptom_history(None).await.unwrap_err();
    assert_eq!(
        err.user_message(Operation::SymptomHistory),
        "Please log in to view your symptom history."
    );
    // Only the identified request reached the backend
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn hospitals_request_body() {
    let (base, seen) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let list = client
        .find_nearby_hospitals(Coordinates::new(5.6037, -0.187), 10_000)
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Korle Bu Teaching Hospital");
    assert!(list[0].maps_url.is_some());

    let seen = seen.lock().unwrap();
    let body = &seen[0].2;
    assert_eq!(body["latitude"], 5.6037);
    assert_eq!(body["longitude"], -0.187);
    assert_eq!(body["radius_meters"], 10_000);
}

#[tokio::test]
async fn login_and_signup() {
    let (base, _) = spawn_backend().await;
    let client = ApiClient::new(&base);

    let session = client
        .login(&Credentials {
            email: "ama@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.user_id, 12);
    assert_eq!(session.email, "ama@example.com");

    let err = client
        .login(&Credentials {
            email: "ama@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(Operation::Login), "Invalid email or password.");

    let err = client
        .signup(&Credentials {
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(Operation::Signup),
        "value is not a valid email address"
    );
}

#[tokio::test]
async fn backend_status() {
    let (base, _) = spawn_backend().await;
    let status = ApiClient::new(&base).backend_status().await.unwrap();
    assert!(status.message.starts_with("SafeLink AI Backend"));
}
