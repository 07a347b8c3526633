//! Interview session API handlers
//!
//! Session mutations take `AppState::session_writes` for the whole
//! load-modify-save cycle so concurrent answers never overwrite each other.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use dna_common::events::DnaEvent;
use dna_common::session::{Answer, Progress, SessionStatus};
use dna_common::{NarrativeProfile, NarrativeReport, Question, Session, TranscriptAnalysis};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::sessions::{self as store, SessionSummary};
use crate::{error::ApiResult, ApiError, AppState};

/// POST /api/sessions response
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub progress: Progress,
    pub question: Option<Question>,
}

/// GET /api/sessions/:id response
#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub progress: Progress,
    pub current_question: Option<Question>,
    pub profile: NarrativeProfile,
    pub answers: Vec<Answer>,
    pub skipped: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

/// POST /api/sessions/:id/answers request
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub transcript: String,
}

/// Response to answering or skipping a question
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub progress: Progress,
    /// Present only when an answer was scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TranscriptAnalysis>,
    pub next_question: Option<Question>,
}

/// GET /api/sessions/:id/report response
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub session_id: Uuid,
    /// True once every question has been answered or skipped
    #[serde(rename = "final")]
    pub is_final: bool,
    pub report: NarrativeReport,
}

fn parse_session_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: {}", raw)))
}

async fn require_session(state: &AppState, session_id: Uuid) -> ApiResult<Session> {
    store::load_session(&state.db, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<SessionCreatedResponse>)> {
    let session = Session::new();
    store::save_session(&state.db, &session).await?;

    tracing::info!(session_id = %session.session_id, "Session started");
    state.event_bus.emit_lossy(DnaEvent::SessionStarted {
        session_id: session.session_id,
        timestamp: Utc::now(),
    });

    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id: session.session_id,
            status: session.status,
            progress: session.progress(&state.questions),
            question: session.current_question(&state.questions).copied(),
        }),
    ))
}

/// GET /api/sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<SessionListResponse>> {
    let sessions = store::list_sessions(&state.db).await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionDetailResponse>> {
    let session_id = parse_session_id(&id)?;
    let session = require_session(&state, session_id).await?;

    Ok(Json(SessionDetailResponse {
        session_id: session.session_id,
        status: session.status,
        progress: session.progress(&state.questions),
        current_question: session.current_question(&state.questions).copied(),
        profile: session.profile,
        answers: session.answers,
        skipped: session.skipped,
        created_at: session.created_at,
        updated_at: session.updated_at,
    }))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let session_id = parse_session_id(&id)?;
    let _guard = state.session_writes.lock().await;

    if !store::delete_session(&state.db, session_id).await? {
        return Err(ApiError::NotFound(format!("Session {} not found", session_id)));
    }

    tracing::info!(session_id = %session_id, "Session deleted");
    state.event_bus.emit_lossy(DnaEvent::SessionDeleted {
        session_id,
        timestamp: Utc::now(),
    });

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/answers
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> ApiResult<Json<AdvanceResponse>> {
    let session_id = parse_session_id(&id)?;
    let _guard = state.session_writes.lock().await;

    let mut session = require_session(&state, session_id).await?;
    let question = session.current_question(&state.questions);
    let analysis = session.record_answer(&state.questions, &state.engine, &request.transcript)?;
    store::save_session(&state.db, &session).await?;

    if let Some(question) = question {
        tracing::info!(
            session_id = %session_id,
            question = question.id,
            matches = analysis.matches.len(),
            "Answer recorded"
        );
        state.event_bus.emit_lossy(DnaEvent::AnswerRecorded {
            session_id,
            question_id: question.id.to_string(),
            domain: question.domain,
            matched_rules: analysis.matches.len(),
            timestamp: Utc::now(),
        });
    }
    emit_if_completed(&state, &session);

    Ok(Json(AdvanceResponse {
        session_id,
        status: session.status,
        progress: session.progress(&state.questions),
        analysis: Some(analysis),
        next_question: session.current_question(&state.questions).copied(),
    }))
}

/// POST /api/sessions/:id/skip
pub async fn skip_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AdvanceResponse>> {
    let session_id = parse_session_id(&id)?;
    let _guard = state.session_writes.lock().await;

    let mut session = require_session(&state, session_id).await?;
    let question = session.current_question(&state.questions);
    session.skip_question(&state.questions)?;
    store::save_session(&state.db, &session).await?;

    if let Some(question) = question {
        tracing::info!(session_id = %session_id, question = question.id, "Question skipped");
        state.event_bus.emit_lossy(DnaEvent::QuestionSkipped {
            session_id,
            question_id: question.id.to_string(),
            timestamp: Utc::now(),
        });
    }
    emit_if_completed(&state, &session);

    Ok(Json(AdvanceResponse {
        session_id,
        status: session.status,
        progress: session.progress(&state.questions),
        analysis: None,
        next_question: session.current_question(&state.questions).copied(),
    }))
}

/// GET /api/sessions/:id/report
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReportResponse>> {
    let session_id = parse_session_id(&id)?;
    let session = require_session(&state, session_id).await?;
    let report = session.report(&state.renderer)?;

    state.event_bus.emit_lossy(DnaEvent::ReportGenerated {
        session_id,
        dominant_trait: report.dominant_trait,
        dominant_value: report.dominant_value,
        dominant_motivator: report.dominant_motivator,
        timestamp: Utc::now(),
    });

    Ok(Json(ReportResponse {
        session_id,
        is_final: session.is_completed(),
        report,
    }))
}

fn emit_if_completed(state: &AppState, session: &Session) {
    if session.is_completed() {
        tracing::info!(
            session_id = %session.session_id,
            answered = session.answers.len(),
            "Session completed"
        );
        state.event_bus.emit_lossy(DnaEvent::SessionCompleted {
            session_id: session.session_id,
            answered: session.answers.len(),
            timestamp: Utc::now(),
        });
    }
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/answers", post(submit_answer))
        .route("/api/sessions/:id/skip", post(skip_question))
        .route("/api/sessions/:id/report", get(get_report))
}
