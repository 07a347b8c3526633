//! dna-server library - Deep Narrative Analysis HTTP service
//!
//! Exposes the router and state for integration testing.

use axum::Router;
use chrono::{DateTime, Utc};
use dna_common::events::EventBus;
use dna_common::{QuestionBank, ReportRenderer, ScoringEngine, ScoringWeights};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    pub engine: Arc<ScoringEngine>,
    pub renderer: Arc<ReportRenderer>,
    pub questions: QuestionBank,
    /// Serializes load-modify-save of sessions
    pub session_writes: Arc<Mutex<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        weights: ScoringWeights,
    ) -> dna_common::Result<Self> {
        Ok(Self {
            db,
            event_bus,
            engine: Arc::new(ScoringEngine::new(weights)),
            renderer: Arc::new(ReportRenderer::new()?),
            questions: QuestionBank::standard(),
            session_writes: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::question_routes())
        .merge(api::analyze_routes())
        .merge(api::session_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
