//! JSON Schema checks for input documents.
//!
//! Documents are checked before deserialization so a bad record is reported
//! by its JSON pointer instead of as a generic parse failure.

use std::sync::OnceLock;

use super::parser::KbError;

type Compiled = Result<jsonschema::Validator, String>;

static KNOWLEDGE_BASE_SCHEMA: OnceLock<Compiled> = OnceLock::new();
static RECORDS_SCHEMA: OnceLock<Compiled> = OnceLock::new();

/// Which document shape to check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    KnowledgeBase,
    Records,
}

impl DocumentKind {
    /// Embedded schema text for this kind.
    fn schema_source(self) -> &'static str {
        match self {
            DocumentKind::KnowledgeBase => include_str!("../../schema/knowledge_base.schema.json"),
            DocumentKind::Records => include_str!("../../schema/records.schema.json"),
        }
    }

    fn compiled(self) -> &'static Compiled {
        let slot = match self {
            DocumentKind::KnowledgeBase => &KNOWLEDGE_BASE_SCHEMA,
            DocumentKind::Records => &RECORDS_SCHEMA,
        };
        slot.get_or_init(|| {
            let schema: serde_json::Value = serde_json::from_str(self.schema_source())
                .map_err(|e| format!("{:?} schema is not JSON: {}", self, e))?;
            jsonschema::options()
                .build(&schema)
                .map_err(|e| format!("{:?} schema does not compile: {}", self, e))
        })
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer into the checked document
    pub pointer: String,
    pub message: String,
}

/// Every violation of the `kind` schema in `document`, in document order.
///
/// An empty list means the document is valid.
pub fn schema_violations(
    kind: DocumentKind,
    document: &serde_json::Value,
) -> Result<Vec<SchemaViolation>, KbError> {
    let validator = kind
        .compiled()
        .as_ref()
        .map_err(|e| KbError::SchemaUnavailable(e.clone()))?;

    Ok(validator
        .iter_errors(document)
        .map(|e| SchemaViolation {
            pointer: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_knowledge_base() {
        let value = json!([
            { "question": "What is the capital of France?", "answer": "Paris" },
            { "question": "What is H2O?", "answer": "Water" }
        ]);
        assert!(schema_violations(DocumentKind::KnowledgeBase, &value).unwrap().is_empty());
    }

    #[test]
    fn test_missing_answer_points_at_entry() {
        let value = json!([
            { "question": "What is the capital of France?", "answer": "Paris" },
            { "question": "What is H2O?" }
        ]);
        let errors = schema_violations(DocumentKind::KnowledgeBase, &value).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].pointer, "/1");
        assert!(errors[0].message.contains("answer"));
    }

    #[test]
    fn test_valid_records() {
        let value = json!([
            {
                "question_id": 1,
                "question": "What is the capital of France?",
                "response": "Paris",
                "is_kb_question": true
            }
        ]);
        assert!(schema_violations(DocumentKind::Records, &value).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_field_type() {
        let value = json!([
            {
                "question_id": 1,
                "question": "What is the capital of France?",
                "response": "Paris",
                "is_kb_question": "yes"
            }
        ]);
        let errors = schema_violations(DocumentKind::Records, &value).unwrap();
        assert_eq!(errors[0].pointer, "/0/is_kb_question");
    }

    #[test]
    fn test_negative_question_id() {
        let value = json!([
            { "question_id": -4, "question": "q", "response": "r", "is_kb_question": false }
        ]);
        assert!(!schema_violations(DocumentKind::Records, &value).unwrap().is_empty());
    }

    #[test]
    fn test_embedded_schemas_compile() {
        for kind in [DocumentKind::KnowledgeBase, DocumentKind::Records] {
            assert!(kind.compiled().is_ok(), "{:?} schema failed to compile", kind);
        }
    }

    #[test]
    fn test_not_a_list() {
        let value = json!({ "question": "q", "answer": "a" });
        assert!(!schema_violations(DocumentKind::KnowledgeBase, &value).unwrap().is_empty());
    }
}
