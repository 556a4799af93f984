//! Loading of knowledge-base and record documents.
//!
//! Inputs are structured data checked against embedded JSON Schemas before
//! they are deserialized.

mod parser;
mod schema;

pub use parser::{load_records_json, load_records_json_file, KbError, KnowledgeBase};
pub use schema::{schema_violations, DocumentKind, SchemaViolation};
