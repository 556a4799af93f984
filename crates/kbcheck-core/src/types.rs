//! Core data types for knowledge-base validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A curated question/answer pair treated as ground truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeBaseEntry {
    pub question: String,
    pub answer: String,
}

impl KnowledgeBaseEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// One question asked upstream together with the response it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionRecord {
    /// Stable identifier used to align results with inputs
    pub question_id: u64,

    pub question: String,

    /// The generated answer to validate
    pub response: String,

    /// Whether the question was drawn from the knowledge base
    pub is_kb_question: bool,
}

impl QuestionRecord {
    pub fn new(
        question_id: u64,
        question: impl Into<String>,
        response: impl Into<String>,
        is_kb_question: bool,
    ) -> Self {
        Self {
            question_id,
            question: question.into(),
            response: response.into(),
            is_kb_question,
        }
    }
}

/// Verdict for a single response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Response agrees with the knowledge base
    Ok,

    /// Response should be regenerated or escalated
    Retry,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// Why a response received its status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    MatchesKb,
    AnswerDiffers,
    OutOfDomain,
}

impl Reason {
    /// The status implied by this reason.
    pub fn status(&self) -> Status {
        match self {
            Reason::MatchesKb => Status::Ok,
            Reason::AnswerDiffers | Reason::OutOfDomain => Status::Retry,
        }
    }

    /// Human-readable message attached to results with this reason.
    pub fn message(&self) -> &'static str {
        match self {
            Reason::MatchesKb => "OK: answer matches KB",
            Reason::AnswerDiffers => "RETRY: answer differs from KB",
            Reason::OutOfDomain => "RETRY: out-of-domain",
        }
    }
}

/// The outcome of validating one response.
///
/// Results are only built through [`ValidationResult::out_of_domain`] and
/// [`ValidationResult::graded`], which keep `status`, `reason`, `kb_answer`
/// and `similarity` consistent with each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub question_id: u64,
    pub question: String,
    pub status: Status,
    pub reason: Reason,
    pub message: String,

    /// Reference answer, absent for out-of-domain questions
    pub kb_answer: Option<String>,

    pub model_response: String,

    /// Similarity in `[0, 1]`, present exactly when `kb_answer` is
    pub similarity: Option<f64>,

    pub is_kb_question: bool,
}

impl ValidationResult {
    /// Result for a question with no knowledge-base entry.
    pub fn out_of_domain(record: &QuestionRecord) -> Self {
        let reason = Reason::OutOfDomain;
        Self {
            question_id: record.question_id,
            question: record.question.clone(),
            status: reason.status(),
            reason,
            message: reason.message().to_string(),
            kb_answer: None,
            model_response: record.response.clone(),
            similarity: None,
            is_kb_question: record.is_kb_question,
        }
    }

    /// Result for a question graded against a knowledge-base answer.
    pub fn graded(record: &QuestionRecord, kb_answer: &str, similarity: f64, matches: bool) -> Self {
        let reason = if matches {
            Reason::MatchesKb
        } else {
            Reason::AnswerDiffers
        };
        Self {
            question_id: record.question_id,
            question: record.question.clone(),
            status: reason.status(),
            reason,
            message: reason.message().to_string(),
            kb_answer: Some(kb_answer.to_string()),
            model_response: record.response.clone(),
            similarity: Some(similarity),
            is_kb_question: record.is_kb_question,
        }
    }
}

/// Run-level statistics over a full sequence of results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_questions: usize,
    pub kb_questions: usize,
    pub edge_questions: usize,
    pub ok_responses: usize,
    pub retry_responses: usize,
    pub out_of_domain: usize,
    pub answer_differs: usize,
    pub matches_kb: usize,

    /// Mean similarity of graded KB questions, 3 decimals
    pub average_similarity_kb: f64,

    /// Percentage of RETRY results, 2 decimals
    pub hallucination_rate: f64,
}

/// Everything produced by one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub validated_at: DateTime<Utc>,
    pub similarity_threshold: f64,
    pub results: Vec<ValidationResult>,
    pub summary: Summary,
}
