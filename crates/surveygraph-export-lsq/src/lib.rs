//! Validated document serialization into the `.lsq` wire format.
//!
//! The import side of the external survey platform is strict about this
//! format: each section declares its field names up front, field order is
//! fixed, the question type is a single character, flags are exactly `Y` or
//! `N`, and numeric positions never carry empty values. The serializer
//! applies all of those rules; the wire document it produces renders to XML
//! byte-identically for semantically equal inputs.

pub mod schema;
pub mod serializer;
pub mod wire;

pub use schema::WireSchema;
pub use serializer::LsqSerializer;
pub use wire::{WireDocument, WireSection};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xml rendering failed: {0}")]
    Xml(String),
    #[error(transparent)]
    Model(#[from] surveygraph_model::Error),
}
