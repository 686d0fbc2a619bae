#![forbid(unsafe_code)]

//! Core domain model and analytics for the trainlog training journal.
//!
//! This crate provides:
//! - Domain types (lifestyle ratings, lifts, bodyweight skills, session load)
//! - Record store (CSV tables, in-memory store) and its schema contract
//! - Readiness, load, fatigue and hybrid score analytics
//! - Exam-based effort tables
//! - Session recommendation engine

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod numeric;
pub mod schema;
pub mod store;
pub mod snapshot;
pub mod readiness;
pub mod load;
pub mod fatigue;
pub mod hybrid;
pub mod exam;
pub mod recommend;
pub mod dashboard;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use schema::Table;
pub use store::{CsvStore, MemoryStore, RawRow, RecordStore, Upsert};
pub use snapshot::Snapshot;
pub use dashboard::Dashboard;
pub use hybrid::{HybridScore, SkillTier};
pub use fatigue::FatigueSummary;
pub use recommend::{recommend, BlockFocus, Prescription, RecommendationInput};
