//! # kbcheck-core
//!
//! Deterministic validation of generated answers against a curated
//! knowledge base (KB).
//!
//! For each (question, response) pair this crate answers:
//! - Is the question covered by the KB at all?
//! - If so, does the response agree with the KB answer?
//! - Across a run, how often did responses need a retry?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No model calls**: Grading is normalization plus string similarity
//! 3. **Total**: Normalization, scoring and classification never fail
//! 4. **Parallel-safe**: The KB index is immutable once built
//!
//! ## Example
//!
//! ```rust,ignore
//! use kbcheck_core::{KnowledgeBase, KnowledgeBaseIndex, ResponseClassifier, Status};
//!
//! let kb = KnowledgeBase::from_json_file("kb.json")?;
//! let index = KnowledgeBaseIndex::from_entries(kb.entries);
//! let classifier = ResponseClassifier::new(0.8)?;
//!
//! let result = classifier.classify("What is the capital of France?", "Paris", &index);
//! match result.status {
//!     Status::Ok => println!("{}", result.message),
//!     Status::Retry => println!("{} ({:?})", result.message, result.reason),
//! }
//! ```

pub mod batch;
pub mod classifier;
pub mod config;
pub mod index;
pub mod input;
pub mod normalize;
pub mod similarity;
pub mod summary;
pub mod types;

// Re-export main types at crate root
pub use batch::{validate, validate_all, NullSink, TracingSink, ValidationSink};
pub use classifier::{classify, ResponseClassifier};
pub use config::{
    ConfigError, DuplicatePolicy, NormalizationRules, ValidatorConfig, DEFAULT_PUNCTUATION,
    DEFAULT_THRESHOLD,
};
pub use index::{DuplicateQuestion, KnowledgeBaseIndex};
pub use input::{load_records_json, load_records_json_file, KbError, KnowledgeBase};
pub use normalize::{normalize, Normalizer};
pub use similarity::{matching_blocks, similarity, MatchingBlock};
pub use summary::{summarize, SummaryAggregator};
pub use types::{
    KnowledgeBaseEntry, QuestionRecord, Reason, Status, Summary, ValidationReport,
    ValidationResult,
};

use thiserror::Error;

/// Errors at the boundary of a validation run.
///
/// Grading itself cannot fail; these all come from missing or malformed
/// inputs and configuration. A missing input file surfaces as
/// `Kb(KbError::MissingInput)`.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Knowledge base error: {0}")]
    Kb(#[from] KbError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Build a KB index under `config`'s normalization and duplicate policy.
pub fn build_index(
    kb: KnowledgeBase,
    config: &ValidatorConfig,
) -> Result<KnowledgeBaseIndex, ValidationError> {
    let normalizer = Normalizer::new(config.normalization.clone())?;
    let index = KnowledgeBaseIndex::build(kb.entries, normalizer, config.duplicate_policy)?;
    Ok(index)
}
