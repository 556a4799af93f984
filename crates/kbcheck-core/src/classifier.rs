//! ResponseClassifier: grades one response against the knowledge base.
//!
//! | Status | Reason | Condition |
//! |--------|--------|-----------|
//! | **RETRY** | `out-of-domain` | Question has no KB entry |
//! | **OK** | `matches-kb` | Similarity to the KB answer `>=` threshold |
//! | **RETRY** | `answer-differs` | Similarity below threshold |
//!
//! Responses are compared whole. A verbose but correct answer ("The capital
//! of France is Paris.") scores low against a terse KB answer ("Paris").

use crate::config::{check_threshold, ConfigError, ValidatorConfig, DEFAULT_THRESHOLD};
use crate::index::KnowledgeBaseIndex;
use crate::normalize::Normalizer;
use crate::similarity::similarity;
use crate::types::{QuestionRecord, ValidationResult};

/// Classifies responses with a fixed normalizer and threshold.
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    normalizer: Normalizer,
    threshold: f64,
}

impl ResponseClassifier {
    /// Default rules with the given threshold.
    ///
    /// Fails unless the threshold is finite and within `[0, 1]`.
    pub fn new(threshold: f64) -> Result<Self, ConfigError> {
        check_threshold(threshold)?;
        Ok(Self {
            normalizer: Normalizer::default(),
            threshold,
        })
    }

    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(config.normalization.clone())?,
            threshold: config.similarity_threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Grade `response` to `question`.
    pub fn classify(
        &self,
        question: &str,
        response: &str,
        index: &KnowledgeBaseIndex,
    ) -> ValidationResult {
        let record = QuestionRecord::new(0, question, response, false);
        self.classify_record(&record, index)
    }

    /// Grade a full record, carrying its id and KB flag into the result.
    pub fn classify_record(
        &self,
        record: &QuestionRecord,
        index: &KnowledgeBaseIndex,
    ) -> ValidationResult {
        let Some(kb_answer) = index.lookup(&record.question) else {
            tracing::debug!(question_id = record.question_id, "Question not in KB");
            return ValidationResult::out_of_domain(record);
        };

        let sim = similarity(
            &self.normalizer.normalize(&record.response),
            &self.normalizer.normalize(kb_answer),
        );
        let matches = sim >= self.threshold;

        tracing::debug!(
            question_id = record.question_id,
            similarity = sim,
            threshold = self.threshold,
            matches,
            "Graded response against KB"
        );

        ValidationResult::graded(record, kb_answer, sim, matches)
    }
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self {
            normalizer: Normalizer::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Grade `response` with default normalization.
///
/// The only failure is an invalid threshold; grading itself is total.
pub fn classify(
    question: &str,
    response: &str,
    index: &KnowledgeBaseIndex,
    threshold: f64,
) -> Result<ValidationResult, ConfigError> {
    Ok(ResponseClassifier::new(threshold)?.classify(question, response, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizationRules;
    use crate::types::{KnowledgeBaseEntry, Reason, Status};

    fn france() -> KnowledgeBaseIndex {
        KnowledgeBaseIndex::from_entries(vec![KnowledgeBaseEntry::new(
            "What is the capital of France?",
            "Paris",
        )])
    }

    #[test]
    fn test_exact_answer_matches() {
        let result = classify("What is the capital of France?", "Paris", &france(), 0.8).unwrap();

        assert_eq!(result.status, Status::Ok);
        assert_eq!(result.reason, Reason::MatchesKb);
        assert_eq!(result.message, "OK: answer matches KB");
        assert_eq!(result.kb_answer.as_deref(), Some("Paris"));
        assert_eq!(result.similarity, Some(1.0));
    }

    #[test]
    fn test_normalized_answer_matches() {
        let result = classify("what is the capital of france", "  PARIS!  ", &france(), 0.8).unwrap();
        assert_eq!(result.status, Status::Ok);
        assert_eq!(result.similarity, Some(1.0));
    }

    #[test]
    fn test_verbose_answer_differs() {
        let result = classify(
            "What is the capital of France?",
            "The capital of France is Paris.",
            &france(),
            0.8,
        )
        .unwrap();

        assert_eq!(result.status, Status::Retry);
        assert_eq!(result.reason, Reason::AnswerDiffers);
        assert_eq!(result.message, "RETRY: answer differs from KB");
        let sim = result.similarity.unwrap();
        assert!(sim < 0.3, "similarity {} should be well below 0.8", sim);
    }

    #[test]
    fn test_out_of_domain() {
        let result = classify("What is the capital of Atlantis?", "Poseidonia", &france(), 0.8).unwrap();

        assert_eq!(result.status, Status::Retry);
        assert_eq!(result.reason, Reason::OutOfDomain);
        assert!(result.kb_answer.is_none());
        assert!(result.similarity.is_none());
        assert_eq!(result.model_response, "Poseidonia");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // "pari" vs "paris": 2 * 4 / 9
        let sim = 8.0 / 9.0;
        let classifier = ResponseClassifier::new(sim).unwrap();
        let result = classifier.classify("What is the capital of France?", "Pari", &france());
        assert_eq!(result.status, Status::Ok);

        let classifier = ResponseClassifier::new(0.9).unwrap();
        let result = classifier.classify("What is the capital of France?", "Pari", &france());
        assert_eq!(result.status, Status::Retry);
    }

    #[test]
    fn test_empty_response_and_answer() {
        let index = KnowledgeBaseIndex::from_entries(vec![KnowledgeBaseEntry::new("Say nothing", "")]);

        let result = classify("Say nothing", "", &index, 0.8).unwrap();
        assert_eq!(result.status, Status::Ok);
        assert_eq!(result.similarity, Some(1.0));

        let result = classify("Say nothing", "something", &index, 0.8).unwrap();
        assert_eq!(result.reason, Reason::AnswerDiffers);
        assert_eq!(result.similarity, Some(0.0));
    }

    #[test]
    fn test_classify_record_keeps_identity() {
        let record = QuestionRecord::new(7, "What is the capital of France?", "Paris", true);
        let result = ResponseClassifier::default().classify_record(&record, &france());

        assert_eq!(result.question_id, 7);
        assert!(result.is_kb_question);
        assert_eq!(result.question, "What is the capital of France?");
    }

    #[test]
    fn test_from_config_uses_rules() {
        let config = ValidatorConfig {
            similarity_threshold: 1.0,
            normalization: NormalizationRules {
                punctuation: ".,!?;:'".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let classifier = ResponseClassifier::from_config(&config).unwrap();
        let index = KnowledgeBaseIndex::from_entries(vec![KnowledgeBaseEntry::new(
            "Who wrote Hamlet?",
            "Shakespeare",
        )]);

        let result = classifier.classify("Who wrote Hamlet?", "Shakespeare's", &index);
        assert_eq!(result.status, Status::Retry);

        let result = classifier.classify("Who wrote Hamlet?", "'Shakespeare'", &index);
        assert_eq!(result.status, Status::Ok);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        for threshold in [1.5, -3.0, f64::NAN, f64::INFINITY] {
            let result = classify("What is the capital of France?", "Paris", &france(), threshold);
            assert!(
                matches!(result, Err(ConfigError::InvalidThreshold(_))),
                "threshold {} should be rejected",
                threshold
            );
            assert!(ResponseClassifier::new(threshold).is_err());
        }
    }

    #[test]
    fn test_threshold_kept_as_given() {
        let classifier = ResponseClassifier::new(0.35).unwrap();
        assert_eq!(classifier.threshold(), 0.35);

        // "xyz" shares nothing with "paris"
        let result = classify("What is the capital of France?", "xyz", &france(), 0.0).unwrap();
        assert_eq!(result.status, Status::Ok);
        let result = classify("What is the capital of France?", "xyz", &france(), 0.01).unwrap();
        assert_eq!(result.status, Status::Retry);
    }

    #[test]
    fn test_from_config_rejects_bad_threshold() {
        let config = ValidatorConfig {
            similarity_threshold: 2.0,
            ..Default::default()
        };
        assert!(ResponseClassifier::from_config(&config).is_err());
    }
}
