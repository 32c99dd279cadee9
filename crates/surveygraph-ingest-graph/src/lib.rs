//! Graph-to-tree reconstruction (boundary adapter).
//!
//! The upstream query layer answers one SPARQL SELECT per root entity and
//! hands back a flat multi-row result set: every row repeats the root
//! question's scalar fields and carries at most one attribute fact, one
//! subquestion fact and one answer-option fact (one logical join path per
//! row, nulls elsewhere). This crate folds those rows back into one
//! deduplicated, deterministically ordered [`QuestionDocument`] per root.
//!
//! The inverse-direction normalizer (`surveygraph-ingest-lime`) operates on
//! a different wire shape entirely; the two share only the model crate.

pub mod group;
pub mod question;
pub mod sparql;

pub use group::{reconstruct_groups, GroupFactRow, GroupTree};
pub use question::{reconstruct_question, FactRow};
pub use sparql::{complete_question_query, SparqlResults, GROUPS_QUERY};
