//! Import orchestration and the external collaborators it drives.
//!
//! The orchestrator itself is pure sequencing and bookkeeping: create the
//! survey, then per group create-then-fill, re-keying every question
//! document to the identifiers the target assigns along the way, and never
//! letting one question's failure touch its siblings. The RPC and SPARQL
//! clients live here too; both are strictly sequential — the import API
//! has no transactional isolation and children need parent-assigned
//! identifiers that only exist after the parent call returns.

pub mod client;
pub mod config;
pub mod graphdb;
pub mod orchestrator;
pub mod report;

pub use client::{LimeSurveyClient, SurveyImporter};
pub use config::{GraphDbConfig, LimeConfig};
pub use graphdb::GraphDbClient;
pub use orchestrator::{import_survey, GroupPlan, QuestionPlan, QuestionSource, SurveyPlan};
pub use report::{ImportFailure, ImportReport, ImportStage};
