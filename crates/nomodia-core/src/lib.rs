//! nomodia-core: Assessment engine, question pools, and scoring.
//!
//! This crate defines the session data model, the shuffle and scoring logic,
//! and the store and supply seams that the rest of nomodia builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod palette;
pub mod pools;
pub mod report;
pub mod scoring;
pub mod shuffle;
pub mod store;
pub mod supply;
pub mod traits;

pub use engine::{AnswerOutcome, AssessmentEngine, DEFAULT_SESSION_KEY};
pub use model::{Question, SessionState, SessionStatus, SetKind};
pub use pools::QuestionPools;
pub use supply::SupplyOutcome;
