//! Shared model types for the surveygraph pipeline.
//!
//! This crate defines the canonical in-memory survey hierarchy
//! (survey → group → question → {subquestion, answer option, attribute})
//! plus the flat record shapes the normalizer emits. Both transformation
//! directions and the import orchestrator depend on these types; nothing in
//! here performs I/O.

pub mod error;
pub mod flat;
pub mod ident;
pub mod survey;

pub use error::{Error, Result};
pub use survey::{
    AnswerOption, Group, QuestionDocument, QuestionSummary, Subquestion, FIRST_CLASS_ATTRIBUTES,
};
