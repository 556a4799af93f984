//! Batch validation of a full record list.
//!
//! Progress is reported through an injected [`ValidationSink`] rather than a
//! global logger, so callers decide where per-record lines go.

use chrono::Utc;
use std::collections::HashMap;

use crate::classifier::ResponseClassifier;
use crate::config::ValidatorConfig;
use crate::index::KnowledgeBaseIndex;
use crate::summary::SummaryAggregator;
use crate::types::{QuestionRecord, ValidationReport, ValidationResult};
use crate::ValidationError;

/// Receives progress events during a batch run.
pub trait ValidationSink {
    /// Called before a record is classified.
    fn on_record(&mut self, _record: &QuestionRecord) {}

    /// Called with each result, in input order.
    fn on_result(&mut self, result: &ValidationResult);
}

/// Writes the per-record progress lines through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ValidationSink for TracingSink {
    fn on_record(&mut self, record: &QuestionRecord) {
        tracing::info!("Validating question {}: {}", record.question_id, record.question);
    }

    fn on_result(&mut self, result: &ValidationResult) {
        tracing::info!("Result: {}", result.message);
        if let Some(answer) = &result.kb_answer {
            tracing::info!("KB Answer: {}", answer);
        }
        tracing::info!("Model Response: {}", result.model_response);
        if let Some(sim) = result.similarity {
            tracing::info!("Similarity: {:.3}", sim);
        }
        tracing::info!("{}", "-".repeat(50));
    }
}

/// Discards all events.
#[derive(Debug, Default)]
pub struct NullSink;

impl ValidationSink for NullSink {
    fn on_result(&mut self, _result: &ValidationResult) {}
}

/// Classify every record in input order.
///
/// Fails before classifying anything if two records share a `question_id`,
/// since results could no longer be aligned with their inputs.
pub fn validate_all(
    records: &[QuestionRecord],
    index: &KnowledgeBaseIndex,
    classifier: &ResponseClassifier,
    sink: &mut dyn ValidationSink,
) -> Result<Vec<ValidationResult>, ValidationError> {
    check_unique_ids(records)?;

    let mut results = Vec::with_capacity(records.len());
    for record in records {
        sink.on_record(record);
        let result = classifier.classify_record(record, index);
        sink.on_result(&result);
        results.push(result);
    }

    Ok(results)
}

/// Classify and summarize a record list under `config`.
pub fn validate(
    records: &[QuestionRecord],
    index: &KnowledgeBaseIndex,
    config: &ValidatorConfig,
    sink: &mut dyn ValidationSink,
) -> Result<ValidationReport, ValidationError> {
    let classifier = ResponseClassifier::from_config(config)?;
    let results = validate_all(records, index, &classifier, sink)?;
    let summary = SummaryAggregator::new().summarize(&results);

    tracing::debug!(
        total = summary.total_questions,
        retry = summary.retry_responses,
        "Validation run complete"
    );

    Ok(ValidationReport {
        validated_at: Utc::now(),
        similarity_threshold: classifier.threshold(),
        results,
        summary,
    })
}

fn check_unique_ids(records: &[QuestionRecord]) -> Result<(), ValidationError> {
    let mut seen: HashMap<u64, usize> = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        if let Some(first) = seen.insert(record.question_id, position) {
            return Err(ValidationError::MalformedRecord(format!(
                "question_id {} appears at positions {} and {}",
                record.question_id, first, position
            )));
        }
    }
    Ok(())
}
