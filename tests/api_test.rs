use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use studypal::api::router;
use studypal::assistant::{AssistantClient, DisabledAssistant};
use studypal::db::init_memory_pool;
use studypal::error::AppError;
use studypal::models::ChatEntry;
use studypal::state::AppState;
use tower::ServiceExt;

/// Answers with a fixed reply and remembers how much history it was given.
struct StubAssistant {
    seen_history: Mutex<Vec<usize>>,
}

#[async_trait]
impl AssistantClient for StubAssistant {
    async fn reply(&self, message: &str, history: &[ChatEntry]) -> Result<String, AppError> {
        if let Ok(mut seen) = self.seen_history.lock() {
            seen.push(history.len());
        }
        Ok(format!("You asked: {}", message))
    }
}

async fn test_state(assistant: Arc<dyn AssistantClient>) -> AppState {
    let pool = init_memory_pool().await.expect("Failed to create test db");
    AppState::new(pool, assistant)
}

async fn test_app() -> Router {
    router(test_state(Arc::new(DisabledAssistant)).await)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, value)
}

async fn register(app: &Router, email: &str, name: &str) -> Value {
    let (status, user) = send(
        app,
        Method::POST,
        "/auth/register",
        Some(json!({
            "username": name.to_lowercase(),
            "email": email,
            "password": "correct horse",
            "name": name,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = test_app().await;
    let user = register(&app, "Ada@Example.com", "Ada Lovelace").await;

    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["role"], "student");
    assert!(user.get("password_hash").is_none());
    assert!(
        user["avatar"]
            .as_str()
            .expect("avatar set")
            .starts_with("https://ui-avatars.com/api/")
    );

    let (status, profiles) = send(
        &app,
        Method::GET,
        &format!("/user_profiles?user_id={}", user["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profiles[0]["study_preferences"]["study_duration"], 45);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        Some(json!({
            "username": "ada2",
            "email": "ada@example.com",
            "password": "x",
            "name": "Ada Again",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, logged_in) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({"email": "ada@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(logged_in["last_login"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({"email": "ada@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_course_crud_and_validation() {
    let app = test_app().await;

    let (status, _) = send(&app, Method::POST, "/courses", Some(json!({"title": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, course) = send(
        &app,
        Method::POST,
        "/courses",
        Some(json!({
            "title": "Linear Algebra",
            "category": "Mathematics",
            "total_lessons": 12,
            "tags": ["matrices"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(course["status"], "not_started");
    let id = course["id"].as_i64().expect("course id");

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/courses/{}", id),
        Some(json!({"progress": 40})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["progress"], 40);
    assert_eq!(updated["title"], "Linear Algebra");

    let (_, listed) = send(&app, Method::GET, "/courses?category=Mathematics", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::DELETE, &format!("/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quiz_attempt_is_graded() {
    let app = test_app().await;
    let (status, quiz) = send(
        &app,
        Method::POST,
        "/quizzes",
        Some(json!({
            "title": "Derivatives",
            "time_limit": 15,
            "questions": [
                {"id": 1, "question": "d/dx x^2", "options": ["x", "2x", "x^2"], "correct_option": 1},
                {"id": 2, "question": "d/dx 5", "options": ["0", "5"], "correct_option": 0},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(quiz["total_questions"], 2);
    let quiz_id = quiz["id"].as_i64().expect("quiz id");

    let (status, attempt) = send(
        &app,
        Method::POST,
        &format!("/quizzes/{}/attempts", quiz_id),
        Some(json!({
            "user_id": 1,
            "answers": [
                {"question_id": 1, "selected_option": 1},
                {"question_id": 2, "selected_option": 1},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(attempt["score"], 50);
    assert_eq!(attempt["answers"][0]["is_correct"], true);

    let (_, attempts) = send(&app, Method::GET, "/quiz_attempts?user_id=1", None).await;
    assert_eq!(attempts.as_array().map(Vec::len), Some(1));

    let (status, _) = send(
        &app,
        Method::POST,
        "/quizzes/999/attempts",
        Some(json!({"user_id": 1, "answers": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tasks_accept_put_as_patch() {
    let app = test_app().await;
    let (status, task) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({"userId": 1, "title": "Read chapter 3", "dueDate": "2026-03-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "medium");
    let id = task["id"].as_i64().expect("task id");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/tasks/{}", id),
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["title"], "Read chapter 3");

    let (_, pending) = send(&app, Method::GET, "/tasks?userId=1&status=pending", None).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_flashcard_due_filter_and_review() {
    let app = test_app().await;
    let (_, fresh) = send(
        &app,
        Method::POST,
        "/flashcards",
        Some(json!({"userId": 1, "subject": "Spanish", "question": "perro", "answer": "dog"})),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/flashcards",
        Some(json!({
            "userId": 1,
            "subject": "Spanish",
            "question": "gato",
            "answer": "cat",
            "nextReview": "2999-01-01T00:00:00Z",
        })),
    )
    .await;

    let (_, due) = send(&app, Method::GET, "/flashcards?userId=1&due=true", None).await;
    assert_eq!(due.as_array().map(Vec::len), Some(1));
    assert_eq!(due[0]["question"], "perro");

    let (status, reviewed) = send(
        &app,
        Method::POST,
        &format!("/flashcards/{}/review", fresh["id"]),
        Some(json!({"remembered": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reviewed["lastReviewed"].is_string());
    assert!(reviewed["nextReview"].is_string());

    let (_, due) = send(&app, Method::GET, "/flashcards?userId=1&due=true", None).await;
    assert_eq!(due.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_messages_conversations_and_live_feed() {
    let state = test_state(Arc::new(DisabledAssistant)).await;
    let mut live = state.hub.subscribe();
    let app = router(state);

    let ada = register(&app, "ada@example.com", "Ada").await;
    let alan = register(&app, "alan@example.com", "Alan").await;
    let ada_id = ada["id"].as_i64().expect("id");
    let alan_id = alan["id"].as_i64().expect("id");

    let (status, _) = send(
        &app,
        Method::POST,
        "/messages",
        Some(json!({"sender_id": alan_id, "receiver_id": ada_id, "content": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, message) = send(
        &app,
        Method::POST,
        "/messages",
        Some(json!({"sender_id": alan_id, "receiver_id": ada_id, "content": "Lunch?"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["read"], false);

    let pushed = live.recv().await.expect("Failed to receive live message");
    assert_eq!(pushed.content, "Lunch?");

    let (_, conversations) = send(
        &app,
        Method::GET,
        &format!("/messages/conversations?user_id={}", ada_id),
        None,
    )
    .await;
    assert_eq!(conversations[0]["peer_id"], alan_id);
    assert_eq!(conversations[0]["unread_count"], 1);
    assert_eq!(conversations[0]["last_message"], "Lunch?");

    let (_, marked) = send(
        &app,
        Method::POST,
        "/messages/read",
        Some(json!({"user_id": ada_id, "peer_id": alan_id})),
    )
    .await;
    assert_eq!(marked["updated"], 1);

    let (_, conversation) = send(
        &app,
        Method::GET,
        &format!("/messages?user_id={}&peer_id={}", ada_id, alan_id),
        None,
    )
    .await;
    assert_eq!(conversation[0]["read"], true);
}

#[tokio::test]
async fn test_assistant_chat_records_both_sides() {
    let stub = Arc::new(StubAssistant {
        seen_history: Mutex::new(Vec::new()),
    });
    let app = router(test_state(stub.clone()).await);

    let (status, _) = send(
        &app,
        Method::POST,
        "/assistant/chat",
        Some(json!({"user_id": 1, "message": " "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for question in ["What is entropy?", "Give an example"] {
        let (status, reply) = send(
            &app,
            Method::POST,
            "/assistant/chat",
            Some(json!({"user_id": 1, "message": question})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["role"], "assistant");
        assert_eq!(reply["content"], format!("You asked: {}", question));
    }

    let seen = stub.seen_history.lock().expect("lock").clone();
    assert_eq!(seen, vec![0, 2]);

    let (_, history) = send(&app, Method::GET, "/chat_history?user_id=1", None).await;
    assert_eq!(history.as_array().map(Vec::len), Some(4));
    assert_eq!(history[0]["role"], "user");

    let (_, cleared) = send(&app, Method::DELETE, "/chat_history?user_id=1", None).await;
    assert_eq!(cleared["deleted"], 4);
}

#[tokio::test]
async fn test_assistant_unconfigured_keeps_question() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/assistant/chat",
        Some(json!({"user_id": 3, "message": "Hello?"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (_, history) = send(&app, Method::GET, "/chat_history?user_id=3", None).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_insights_for_new_user() {
    let app = test_app().await;
    let user = register(&app, "grace@example.com", "Grace").await;
    let id = user["id"].as_i64().expect("id");

    let (status, streak) = send(&app, Method::GET, &format!("/study_streaks?user_id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(streak["current_streak"], 0);
    assert_eq!(streak["weekly_goal_minutes"], 1200);

    let (status, recs) = send(&app, Method::GET, &format!("/recommendations?user_id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recs[0]["type"], "resource");

    let (status, report) = send(&app, Method::GET, &format!("/users/{}/progress", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["stats"]["average_score"], 0);

    let (status, _) = send(&app, Method::GET, "/users/999/progress", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/study_streaks", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
