//! Session database operations

use chrono::{DateTime, Utc};
use dna_common::session::{Answer, Session, SessionStatus};
use dna_common::{Error, NarrativeProfile, Result};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Lightweight listing row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub question_index: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert or update a session
pub async fn save_session(pool: &SqlitePool, session: &Session) -> Result<()> {
    // Serialize before touching the pool
    let session_id = session.session_id.to_string();
    let profile = serde_json::to_string(&session.profile)?;
    let answers = serde_json::to_string(&session.answers)?;
    let skipped = serde_json::to_string(&session.skipped)?;
    let question_index = i64::try_from(session.question_index).map_err(|_| {
        Error::Internal(format!("question_index out of range: {}", session.question_index))
    })?;

    sqlx::query(
        r#"
        INSERT INTO sessions (
            session_id, status, question_index, profile, answers, skipped,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            status = excluded.status,
            question_index = excluded.question_index,
            profile = excluded.profile,
            answers = excluded.answers,
            skipped = excluded.skipped,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&session_id)
    .bind(session.status.as_str())
    .bind(question_index)
    .bind(&profile)
    .bind(&answers)
    .bind(&skipped)
    .bind(session.created_at.to_rfc3339())
    .bind(session.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a session, `None` if it does not exist
pub async fn load_session(pool: &SqlitePool, session_id: Uuid) -> Result<Option<Session>> {
    let row = sqlx::query(
        r#"
        SELECT session_id, status, question_index, profile, answers, skipped,
               created_at, updated_at
        FROM sessions
        WHERE session_id = ?
        "#,
    )
    .bind(session_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|row| session_from_row(&row)).transpose()
}

/// Delete a session; returns whether a row was removed
pub async fn delete_session(pool: &SqlitePool, session_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
        .bind(session_id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All sessions, newest first
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<SessionSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT session_id, status, question_index, created_at, updated_at
        FROM sessions
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(SessionSummary {
                session_id: parse_uuid(row.try_get("session_id")?)?,
                status: parse_status(row.try_get("status")?)?,
                question_index: parse_index(row.try_get("question_index")?)?,
                created_at: parse_timestamp(row.try_get("created_at")?)?,
                updated_at: parse_timestamp(row.try_get("updated_at")?)?,
            })
        })
        .collect()
}

fn session_from_row(row: &SqliteRow) -> Result<Session> {
    let profile: String = row.try_get("profile")?;
    let profile: NarrativeProfile = serde_json::from_str(&profile)?;

    let answers: String = row.try_get("answers")?;
    let answers: Vec<Answer> = serde_json::from_str(&answers)?;

    let skipped: String = row.try_get("skipped")?;
    let skipped: Vec<String> = serde_json::from_str(&skipped)?;

    Ok(Session {
        session_id: parse_uuid(row.try_get("session_id")?)?,
        status: parse_status(row.try_get("status")?)?,
        question_index: parse_index(row.try_get("question_index")?)?,
        profile,
        answers,
        skipped,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
        updated_at: parse_timestamp(row.try_get("updated_at")?)?,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid session_id {}: {}", s, e)))
}

fn parse_status(s: &str) -> Result<SessionStatus> {
    SessionStatus::parse(s).ok_or_else(|| Error::Internal(format!("Unknown session status: {}", s)))
}

fn parse_index(raw: i64) -> Result<usize> {
    usize::try_from(raw).map_err(|_| Error::Internal(format!("Invalid question_index: {}", raw)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp {}: {}", s, e)))
}
