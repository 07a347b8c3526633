//! Integration tests for dna-server API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints
//! - Question bank listing
//! - Stateless transcript analysis
//! - Session lifecycle: create, answer, skip, report, delete
//! - Error envelopes for bad ids, blank transcripts and completed sessions
//! - SSE event stream handshake

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use dna_common::events::{DnaEvent, EventBus};
use dna_common::ScoringWeights;
use dna_server::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app backed by an in-memory database
async fn setup_app() -> (Router, EventBus) {
    let pool = dna_server::db::init_memory_pool()
        .await
        .expect("Should create in-memory database");
    let event_bus = EventBus::new(100);
    let state = AppState::new(pool, event_bus.clone(), ScoringWeights::default())
        .expect("Should build app state");
    (build_router(state), event_bus)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Send a request and return status plus JSON body (Null when empty)
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, post_empty("/api/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health / build info / questions
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_app().await;
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "dna-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_build_info() {
    let (app, _) = setup_app().await;
    let (status, body) = send(&app, get("/api/buildinfo")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_list_questions() {
    let (app, _) = setup_app().await;
    let (status, body) = send(&app, get("/api/questions")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 12);
    assert_eq!(body["questions"][0]["id"], "childhood-earliest-memory");
    assert_eq!(body["questions"][0]["domain"], "childhood");
}

// =============================================================================
// Stateless analysis
// =============================================================================

#[tokio::test]
async fn test_analyze_transcript() {
    let (app, _) = setup_app().await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/analyze",
            json!({"transcript": "Um, I help my family, but it feels like a weight."}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["values"]["benevolence"], 0.1);
    assert_eq!(body["profile"]["hesitations"], 1);
    assert_eq!(body["analysis"]["matches"][0]["target"]["category"], "value");
    assert_eq!(body["analysis"]["matches"][0]["target"]["key"], "benevolence");
    assert_eq!(body["analysis"]["contradictions"].as_array().unwrap().len(), 1);
    assert_eq!(body["analysis"]["metaphors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_blank_transcript_rejected() {
    let (app, _) = setup_app().await;
    let (status, body) = send(&app, post_json("/api/analyze", json!({"transcript": "  "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[tokio::test]
async fn test_create_and_get_session() {
    let (app, _) = setup_app().await;
    let (status, created) = send(&app, post_empty("/api/sessions")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "in_progress");
    assert_eq!(created["question"]["id"], "childhood-earliest-memory");
    assert_eq!(created["progress"]["total"], 12);

    let id = created["session_id"].as_str().unwrap();
    let (status, detail) = send(&app, get(&format!("/api/sessions/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["session_id"], id);
    assert_eq!(detail["progress"]["current"], 0);
    assert_eq!(detail["profile"]["hesitations"], 0);

    let (status, list) = send(&app, get("/api/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["sessions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_answer_advances_session() {
    let (app, _) = setup_app().await;
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/sessions/{}/answers", id),
            json!({"transcript": "I was always curious and a little anxious."}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["progress"]["answered"], 1);
    assert_eq!(body["analysis"]["matches"].as_array().unwrap().len(), 2);
    assert_eq!(body["next_question"]["id"], "childhood-understood");

    let (_, detail) = send(&app, get(&format!("/api/sessions/{}", id))).await;
    assert_eq!(detail["profile"]["traits"]["openness"], 0.1);
    assert_eq!(detail["profile"]["traits"]["neuroticism"], 0.1);
    assert_eq!(detail["profile"]["domain_coverage"]["childhood"], 1);
    assert_eq!(detail["answers"][0]["question_id"], "childhood-earliest-memory");
}

#[tokio::test]
async fn test_skip_does_not_include_analysis() {
    let (app, _) = setup_app().await;
    let id = create_session(&app).await;

    let (status, body) = send(&app, post_empty(&format!("/api/sessions/{}/skip", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("analysis").is_none());
    assert_eq!(body["progress"]["skipped"], 1);
    assert_eq!(body["next_question"]["id"], "childhood-understood");
}

#[tokio::test]
async fn test_blank_answer_rejected() {
    let (app, _) = setup_app().await;
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        post_json(&format!("/api/sessions/{}/answers", id), json!({"transcript": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_report_before_answers_is_conflict() {
    let (app, _) = setup_app().await;
    let id = create_session(&app).await;

    let (status, body) = send(&app, get(&format!("/api/sessions/{}/report", id))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_report_not_final_while_in_progress() {
    let (app, _) = setup_app().await;
    let id = create_session(&app).await;

    let (status, _) = send(
        &app,
        post_json(
            &format!("/api/sessions/{}/answers", id),
            json!({"transcript": "I love to explore and I want to be free."}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/api/sessions/{}/report", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final"], false);
    assert_eq!(body["session_id"], id.as_str());
    assert!(body["report"]["headline"].is_string());
}

#[tokio::test]
async fn test_full_session_report() {
    let (app, bus) = setup_app().await;
    let mut rx = bus.subscribe();
    let id = create_session(&app).await;

    for i in 0..12 {
        let request = if i == 5 {
            post_empty(&format!("/api/sessions/{}/skip", id))
        } else {
            post_json(
                &format!("/api/sessions/{}/answers", id),
                json!({"transcript": "I want to achieve more, and I worry I never will."}),
            )
        };
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, detail) = send(&app, get(&format!("/api/sessions/{}", id))).await;
    assert_eq!(detail["status"], "completed");
    assert!(detail["current_question"].is_null());

    let (status, body) = send(&app, get(&format!("/api/sessions/{}/report", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final"], true);
    assert_eq!(body["report"]["dominant_trait"], "neuroticism");
    assert_eq!(body["report"]["dominant_value"], "achievement");
    assert_eq!(body["report"]["dominant_motivator"], "mastery");
    assert_eq!(
        body["report"]["headline"],
        "Your story is led by neuroticism and anchored in achievement."
    );

    // Answering a completed session conflicts
    let (status, _) = send(
        &app,
        post_json(
            &format!("/api/sessions/{}/answers", id),
            json!({"transcript": "one more"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Lifecycle events were broadcast
    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(event.event_type());
    }
    assert_eq!(kinds.first(), Some(&"SessionStarted"));
    assert_eq!(kinds.iter().filter(|k| **k == "AnswerRecorded").count(), 11);
    assert_eq!(kinds.iter().filter(|k| **k == "QuestionSkipped").count(), 1);
    assert!(kinds.contains(&"SessionCompleted"));
    assert_eq!(kinds.last(), Some(&"ReportGenerated"));
}

#[tokio::test]
async fn test_delete_session() {
    let (app, bus) = setup_app().await;
    let mut rx = bus.subscribe();
    let id = create_session(&app).await;

    let (status, body) = send(&app, delete(&format!("/api/sessions/{}", id))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, get(&format!("/api/sessions/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete(&format!("/api/sessions/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut deleted = false;
    while let Ok(event) = rx.try_recv() {
        if let DnaEvent::SessionDeleted { session_id, .. } = event {
            assert_eq!(session_id.to_string(), id);
            deleted = true;
        }
    }
    assert!(deleted);
}

#[tokio::test]
async fn test_invalid_and_unknown_session_ids() {
    let (app, _) = setup_app().await;

    let (status, body) = send(&app, get("/api/sessions/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = send(&app, get(&format!("/api/sessions/{}/report", unknown))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_concurrent_answers_are_not_lost() {
    let (app, _) = setup_app().await;
    let id = create_session(&app).await;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let app = app.clone();
        let uri = format!("/api/sessions/{}/answers", id);
        handles.push(tokio::spawn(async move {
            send(&app, post_json(&uri, json!({"transcript": "I learned a new skill"}))).await
        }));
    }
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (_, detail) = send(&app, get(&format!("/api/sessions/{}", id))).await;
    assert_eq!(detail["progress"]["answered"], 6);
    assert_eq!(detail["answers"].as_array().unwrap().len(), 6);
}

// =============================================================================
// Event stream
// =============================================================================

#[tokio::test]
async fn test_event_stream_opens_with_connection_status() {
    let (app, _) = setup_app().await;

    let response = app.clone().oneshot(get("/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"), "{}", content_type);

    // The stream never ends, so read only the first frame
    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let data = frame.into_data().unwrap();
    let text = String::from_utf8_lossy(&data);
    assert!(text.contains("event: ConnectionStatus"), "{}", text);
    assert!(text.contains("data: connected"), "{}", text);
}
