//! SummaryAggregator: reduces validation results into run statistics.
//!
//! Counts and means are order independent, so results from a parallel run
//! can be aggregated in any order once they are all collected.

use crate::types::{Reason, Summary, ValidationResult};

/// The aggregator is stateless; every call recomputes from the full sequence.
pub struct SummaryAggregator;

impl SummaryAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Summarize a full sequence of results.
    ///
    /// An empty sequence yields all-zero statistics, including a 0%
    /// hallucination rate.
    pub fn summarize(&self, results: &[ValidationResult]) -> Summary {
        let total_questions = results.len();
        let kb_questions = results.iter().filter(|r| r.is_kb_question).count();
        let ok_responses = results.iter().filter(|r| r.status.is_ok()).count();

        let count_reason = |reason: Reason| results.iter().filter(|r| r.reason == reason).count();

        Summary {
            total_questions,
            kb_questions,
            edge_questions: total_questions - kb_questions,
            ok_responses,
            retry_responses: total_questions - ok_responses,
            out_of_domain: count_reason(Reason::OutOfDomain),
            answer_differs: count_reason(Reason::AnswerDiffers),
            matches_kb: count_reason(Reason::MatchesKb),
            average_similarity_kb: round_to(self.average_similarity_kb(results), 3),
            hallucination_rate: round_to(
                self.hallucination_rate(total_questions - ok_responses, total_questions),
                2,
            ),
        }
    }

    /// Mean similarity over KB questions that were graded.
    fn average_similarity_kb(&self, results: &[ValidationResult]) -> f64 {
        let (sum, count) = results
            .iter()
            .filter(|r| r.is_kb_question)
            .filter_map(|r| r.similarity)
            .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    fn hallucination_rate(&self, retry: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        100.0 * retry as f64 / total as f64
    }
}

impl Default for SummaryAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarize with a default aggregator.
pub fn summarize(results: &[ValidationResult]) -> Summary {
    SummaryAggregator::new().summarize(results)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionRecord;

    fn graded(id: u64, similarity: f64, is_kb: bool) -> ValidationResult {
        let record = QuestionRecord::new(id, format!("q{}", id), "r", is_kb);
        ValidationResult::graded(&record, "a", similarity, similarity >= 0.8)
    }

    fn out_of_domain(id: u64, is_kb: bool) -> ValidationResult {
        let record = QuestionRecord::new(id, format!("q{}", id), "r", is_kb);
        ValidationResult::out_of_domain(&record)
    }

    #[test]
    fn test_empty_results() {
        let summary = summarize(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.total_questions, 0);
        assert_eq!(summary.hallucination_rate, 0.0);
        assert_eq!(summary.average_similarity_kb, 0.0);
    }

    #[test]
    fn test_average_similarity_kb() {
        let results = vec![graded(1, 1.0, true), graded(2, 0.9, true), graded(3, 0.5, true)];
        let summary = summarize(&results);
        assert!((summary.average_similarity_kb - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_average_ignores_edge_and_ungraded() {
        let results = vec![
            graded(1, 0.6, true),
            graded(2, 0.1, false),
            out_of_domain(3, true),
            out_of_domain(4, false),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.average_similarity_kb, 0.6);
    }

    #[test]
    fn test_average_rounds_to_three_places() {
        let results = vec![graded(1, 1.0, true), graded(2, 0.0, true), graded(3, 0.0, true)];
        assert_eq!(summarize(&results).average_similarity_kb, 0.333);
    }

    #[test]
    fn test_hallucination_rate() {
        let mut results: Vec<ValidationResult> = (1..=10).map(|id| graded(id, 1.0, true)).collect();
        results.extend((11..=15).map(|id| out_of_domain(id, false)));

        let summary = summarize(&results);
        assert_eq!(summary.total_questions, 15);
        assert_eq!(summary.retry_responses, 5);
        assert_eq!(summary.hallucination_rate, 33.33);
    }

    #[test]
    fn test_counts() {
        let results = vec![
            graded(1, 1.0, true),
            graded(2, 0.3, true),
            graded(3, 0.85, true),
            out_of_domain(4, false),
            out_of_domain(5, false),
        ];
        let summary = summarize(&results);

        assert_eq!(summary.total_questions, 5);
        assert_eq!(summary.kb_questions, 3);
        assert_eq!(summary.edge_questions, 2);
        assert_eq!(summary.ok_responses, 2);
        assert_eq!(summary.retry_responses, 3);
        assert_eq!(summary.matches_kb, 2);
        assert_eq!(summary.answer_differs, 1);
        assert_eq!(summary.out_of_domain, 2);
        assert_eq!(summary.hallucination_rate, 60.0);
        assert_eq!(summary.average_similarity_kb, 0.717);
    }

    #[test]
    fn test_order_independent() {
        let mut results = vec![graded(1, 0.2, true), graded(2, 0.9, true), out_of_domain(3, false)];
        let forward = summarize(&results);
        results.reverse();
        assert_eq!(summarize(&results), forward);
    }
}
