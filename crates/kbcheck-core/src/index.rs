//! Exact-match lookup from normalized question to reference answer.
//!
//! Similarity is never used here; a question is either in the knowledge base
//! after normalization or it is out of domain.

use std::collections::HashMap;

use crate::config::DuplicatePolicy;
use crate::input::KbError;
use crate::normalize::Normalizer;
use crate::types::KnowledgeBaseEntry;

/// A KB question whose normalized form collided with an earlier entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateQuestion {
    /// The shared normalized key
    pub key: String,
    pub first_index: usize,
    pub duplicate_index: usize,
}

/// Read-only index over knowledge-base entries.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseIndex {
    normalizer: Normalizer,
    entries: Vec<KnowledgeBaseEntry>,
    by_question: HashMap<String, usize>,
    duplicates: Vec<DuplicateQuestion>,
}

impl KnowledgeBaseIndex {
    /// Index entries with the default normalizer. The first entry wins on
    /// duplicate keys.
    pub fn from_entries(entries: Vec<KnowledgeBaseEntry>) -> Self {
        Self::with_normalizer(entries, Normalizer::default())
    }

    /// Index entries, keeping the first entry for each normalized question.
    ///
    /// Later duplicates are skipped and recorded in [`Self::duplicates`].
    pub fn with_normalizer(entries: Vec<KnowledgeBaseEntry>, normalizer: Normalizer) -> Self {
        let mut by_question = HashMap::with_capacity(entries.len());
        let mut duplicates = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            let key = normalizer.normalize(&entry.question);
            if let Some(&first_index) = by_question.get(&key) {
                tracing::warn!(
                    question = %entry.question,
                    first_index,
                    duplicate_index = index,
                    "Duplicate KB question skipped"
                );
                duplicates.push(DuplicateQuestion {
                    key,
                    first_index,
                    duplicate_index: index,
                });
                continue;
            }
            by_question.insert(key, index);
        }

        Self {
            normalizer,
            entries,
            by_question,
            duplicates,
        }
    }

    /// Index entries under an explicit duplicate policy.
    pub fn build(
        entries: Vec<KnowledgeBaseEntry>,
        normalizer: Normalizer,
        policy: DuplicatePolicy,
    ) -> Result<Self, KbError> {
        let index = Self::with_normalizer(entries, normalizer);

        if policy == DuplicatePolicy::Reject {
            if let Some(dup) = index.duplicates.first() {
                return Err(KbError::DuplicateQuestion {
                    question: index.entries[dup.duplicate_index].question.clone(),
                    first_index: dup.first_index,
                    duplicate_index: dup.duplicate_index,
                });
            }
        }

        Ok(index)
    }

    /// Answer for `question`, if its normalized form is a KB key.
    pub fn lookup(&self, question: &str) -> Option<&str> {
        self.lookup_normalized(&self.normalizer.normalize(question))
    }

    /// Answer for an already-normalized key.
    pub fn lookup_normalized(&self, key: &str) -> Option<&str> {
        self.by_question
            .get(key)
            .map(|&i| self.entries[i].answer.as_str())
    }

    pub fn contains(&self, question: &str) -> bool {
        self.lookup(question).is_some()
    }

    /// Number of distinct questions.
    pub fn len(&self) -> usize {
        self.by_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_question.is_empty()
    }

    /// Indexed questions in their original form and load order.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.duplicates.iter().any(|d| d.duplicate_index == *i))
            .map(|(_, e)| e.question.as_str())
    }

    pub fn duplicates(&self) -> &[DuplicateQuestion] {
        &self.duplicates
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}
