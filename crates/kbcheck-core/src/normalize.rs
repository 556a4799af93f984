//! Text normalization applied before any comparison.
//!
//! Steps, in order: lowercase, collapse whitespace runs to a single space and
//! trim, strip the configured punctuation. Stripping can leave a doubled or
//! edge space behind (`"a . b"`), so whitespace is collapsed once more at the
//! end. That keeps `normalize` idempotent.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{ConfigError, NormalizationRules, DEFAULT_PUNCTUATION};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    static ref DEFAULT_PUNCTUATION_PATTERN: Regex =
        punctuation_pattern(DEFAULT_PUNCTUATION).unwrap();
}

/// Build a character class matching any of `chars`.
fn punctuation_pattern(chars: &str) -> Result<Regex, regex::Error> {
    let class: String = chars
        .chars()
        .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
        .collect();
    Regex::new(&format!("[{}]", class))
}

/// Canonicalizes free text according to a fixed rule set.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: NormalizationRules,
    punctuation: Option<Regex>,
}

impl Normalizer {
    /// Compile a normalizer from rules.
    pub fn new(rules: NormalizationRules) -> Result<Self, ConfigError> {
        let punctuation = if rules.punctuation.is_empty() {
            None
        } else if rules.punctuation == DEFAULT_PUNCTUATION {
            Some(DEFAULT_PUNCTUATION_PATTERN.clone())
        } else {
            let re = punctuation_pattern(&rules.punctuation).map_err(|e| {
                ConfigError::InvalidPunctuation(rules.punctuation.clone(), e.to_string())
            })?;
            Some(re)
        };

        Ok(Self { rules, punctuation })
    }

    pub fn rules(&self) -> &NormalizationRules {
        &self.rules
    }

    /// Normalize `text`. Total and deterministic.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut out = if self.rules.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        if self.rules.collapse_whitespace {
            out = collapse(&out);
        }

        if let Some(re) = &self.punctuation {
            let stripped = re.replace_all(&out, "");
            if self.rules.collapse_whitespace {
                out = collapse(&stripped);
            } else {
                out = stripped.into_owned();
            }
        }

        out
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            rules: NormalizationRules::default(),
            punctuation: Some(DEFAULT_PUNCTUATION_PATTERN.clone()),
        }
    }
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Normalize with the default rules.
pub fn normalize(text: &str) -> String {
    lazy_static! {
        static ref DEFAULT: Normalizer = Normalizer::default();
    }
    DEFAULT.normalize(text)
}
