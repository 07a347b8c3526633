//! Question bank endpoint

use axum::{extract::State, routing::get, Json, Router};
use dna_common::Question;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub total: usize,
    pub questions: Vec<Question>,
}

/// GET /api/questions
pub async fn list_questions(State(state): State<AppState>) -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        total: state.questions.len(),
        questions: state.questions.iter().copied().collect(),
    })
}

pub fn question_routes() -> Router<AppState> {
    Router::new().route("/api/questions", get(list_questions))
}
