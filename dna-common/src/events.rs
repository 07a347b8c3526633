//! Event types for the DNA event system
//!
//! Session lifecycle changes are broadcast on an [`EventBus`] so the server
//! can fan them out to SSE clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::profile::{CoreValue, Domain, Motivator, Trait};

/// DNA event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DnaEvent {
    /// New interview session created
    SessionStarted {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Answer scored into a session
    AnswerRecorded {
        session_id: Uuid,
        question_id: String,
        domain: Domain,
        /// Number of scoring rules that fired
        matched_rules: usize,
        timestamp: DateTime<Utc>,
    },

    QuestionSkipped {
        session_id: Uuid,
        question_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Last question answered or skipped
    SessionCompleted {
        session_id: Uuid,
        answered: usize,
        timestamp: DateTime<Utc>,
    },

    ReportGenerated {
        session_id: Uuid,
        dominant_trait: Trait,
        dominant_value: CoreValue,
        dominant_motivator: Motivator,
        timestamp: DateTime<Utc>,
    },

    SessionDeleted {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl DnaEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            DnaEvent::SessionStarted { .. } => "SessionStarted",
            DnaEvent::AnswerRecorded { .. } => "AnswerRecorded",
            DnaEvent::QuestionSkipped { .. } => "QuestionSkipped",
            DnaEvent::SessionCompleted { .. } => "SessionCompleted",
            DnaEvent::ReportGenerated { .. } => "ReportGenerated",
            DnaEvent::SessionDeleted { .. } => "SessionDeleted",
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            DnaEvent::SessionStarted { session_id, .. }
            | DnaEvent::AnswerRecorded { session_id, .. }
            | DnaEvent::QuestionSkipped { session_id, .. }
            | DnaEvent::SessionCompleted { session_id, .. }
            | DnaEvent::ReportGenerated { session_id, .. }
            | DnaEvent::SessionDeleted { session_id, .. } => *session_id,
        }
    }
}

/// Broadcast bus for [`DnaEvent`]s
///
/// Cloning shares the underlying channel.
///
/// # Examples
///
/// ```
/// use dna_common::events::{DnaEvent, EventBus};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
/// bus.emit_lossy(DnaEvent::SessionStarted {
///     session_id: uuid::Uuid::new_v4(),
///     timestamp: chrono::Utc::now(),
/// });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DnaEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<DnaEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: DnaEvent) -> Result<usize, broadcast::error::SendError<DnaEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: DnaEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No subscribers for event: {}", e.0.event_type());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
