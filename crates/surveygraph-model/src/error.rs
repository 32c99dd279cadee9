//! Error kinds shared across the pipeline.
//!
//! Anything below survey granularity is caught by the orchestrator and
//! converted into an `ImportReport` entry; only `FatalSetup` aborts a run.
//! Malformed identifiers are not represented here at all: they are repaired
//! deterministically by [`crate::ident::sanitize_code`] and never surface.

use thiserror::Error;

/// Result type for surveygraph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An entity is missing its mandatory identifier. The entity is skipped;
    /// this never aborts a batch.
    #[error("incomplete {kind}: {detail}")]
    IncompleteEntity { kind: &'static str, detail: String },

    /// A field value cannot be coerced into its required domain even after
    /// normalization.
    #[error("schema violation in `{field}`: {message}")]
    SchemaViolation { field: String, message: String },

    /// A child references a parent identifier that was never created.
    #[error("unresolved dependency: {entity} requires {dependency}")]
    DependencyUnresolved { entity: String, dependency: String },

    /// The external RPC collaborator is unreachable or returned an
    /// unexpected shape. The core retries zero times.
    #[error("transport error: {0}")]
    Transport(String),

    /// Survey-level creation failed. The only kind that aborts a whole
    /// orchestration run.
    #[error("fatal setup failure: {0}")]
    FatalSetup(String),
}
