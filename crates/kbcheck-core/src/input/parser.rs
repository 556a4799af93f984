//! Parsing of knowledge-base and record documents from JSON/YAML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use super::schema::{schema_violations, DocumentKind};
use crate::types::{KnowledgeBaseEntry, QuestionRecord};

/// Errors that can occur when loading input documents.
#[derive(Error, Debug)]
pub enum KbError {
    #[error("Input not found: {0}")]
    MissingInput(String),

    #[error("Failed to read input file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed record at {pointer}: {message}")]
    MalformedRecord { pointer: String, message: String },

    #[error("Input schema unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("Duplicate KB question {question:?} (entries {first_index} and {duplicate_index})")]
    DuplicateQuestion {
        question: String,
        first_index: usize,
        duplicate_index: usize,
    },
}

/// An ordered list of knowledge-base entries as loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBase {
    pub entries: Vec<KnowledgeBaseEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeBaseEntry>) -> Self {
        Self { entries }
    }

    /// Parse a knowledge base from JSON string.
    ///
    /// Accepts a bare list of entries or `{"knowledge_base": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, KbError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a knowledge base from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, KbError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a knowledge base from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, KbError> {
        let contents = read_input(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parse a knowledge base from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, KbError> {
        let contents = read_input(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse a knowledge base file, picking the format from the extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KbError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_json_file(path),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, KbError> {
        let (prefix, list) = match value {
            serde_json::Value::Object(mut map) if map.contains_key("knowledge_base") => (
                "/knowledge_base",
                map.remove("knowledge_base").unwrap_or_default(),
            ),
            other => ("", other),
        };

        check_schema(DocumentKind::KnowledgeBase, &list, prefix)?;
        let entries: Vec<KnowledgeBaseEntry> = serde_json::from_value(list)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse question records from JSON string.
pub fn load_records_json(json: &str) -> Result<Vec<QuestionRecord>, KbError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    check_schema(DocumentKind::Records, &value, "")?;
    Ok(serde_json::from_value(value)?)
}

/// Parse question records from a JSON file.
pub fn load_records_json_file(path: impl AsRef<Path>) -> Result<Vec<QuestionRecord>, KbError> {
    let contents = read_input(path.as_ref())?;
    load_records_json(&contents)
}

fn read_input(path: &Path) -> Result<String, KbError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => KbError::MissingInput(path.display().to_string()),
        _ => KbError::IoError(e),
    })
}

/// Fail on the first schema violation, logging how many were found.
fn check_schema(
    kind: DocumentKind,
    document: &serde_json::Value,
    prefix: &str,
) -> Result<(), KbError> {
    let violations = schema_violations(kind, document)?;
    let count = violations.len();
    match violations.into_iter().next() {
        None => Ok(()),
        Some(first) => {
            tracing::debug!(kind = ?kind, count, "Schema violations in input");
            Err(KbError::MalformedRecord {
                pointer: format!("{}{}", prefix, first.pointer),
                message: first.message,
            })
        }
    }
}
