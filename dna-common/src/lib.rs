//! # DNA Common Library
//!
//! Shared code for the Deep Narrative Analysis services including:
//! - Narrative profile record and score maps
//! - Keyword scoring engine for answer transcripts
//! - Report rendering from a finished profile
//! - Guided question bank and interview sessions
//! - Event types (DnaEvent enum) and the broadcast bus
//! - Configuration loading and root folder resolution

pub mod config;
pub mod error;
pub mod events;
pub mod profile;
pub mod questions;
pub mod report;
pub mod scoring;
pub mod session;

pub use error::{Error, Result};
pub use profile::{CoreValue, Domain, Motivator, NarrativeProfile, Trait};
pub use questions::{Question, QuestionBank};
pub use report::{NarrativeReport, ReportRenderer};
pub use scoring::{ScoringEngine, ScoringWeights, TranscriptAnalysis};
pub use session::{Session, SessionStatus};
