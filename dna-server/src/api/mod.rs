//! HTTP API handlers for dna-server

pub mod analyze;
pub mod buildinfo;
pub mod health;
pub mod questions;
pub mod sessions;
pub mod sse;

pub use analyze::analyze_routes;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use questions::question_routes;
pub use sessions::session_routes;
pub use sse::event_stream;
