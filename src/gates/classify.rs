//! Answer classification shared by the refusal and hallucination gates
//! and by live-inference metrics.

use regex::{Regex, RegexSet};

use crate::errors::{EvalError, Result};

/// Refusal phrasings, matched case-insensitively anywhere in the answer
pub const REFUSAL_PATTERNS: [&str; 7] = [
    r"the provided context does not contain enough information to answer this question",
    r"not enough information",
    r"insufficient information",
    r"insufficient context",
    r"does not contain enough information",
    r"cannot determine from the provided context",
    r"cannot answer from the provided context",
];

/// Bracketed numeric citation such as `[1]` or `[12]`
pub const CITATION_PATTERN: &str = r"\[\d+\]";

/// Mutually exclusive answer classes; refusal wins over citation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerClass {
    Refusal,
    Cited,
    Hallucinated,
}

#[derive(Debug, Clone)]
pub struct AnswerClassifier {
    refusals: RegexSet,
    citation: Regex,
}

impl AnswerClassifier {
    pub fn new() -> Result<Self> {
        let refusals = RegexSet::new(REFUSAL_PATTERNS.iter().map(|p| format!("(?i){}", p)))
            .map_err(|e| EvalError::ConfigError(format!("invalid refusal pattern: {}", e)))?;
        let citation = Regex::new(CITATION_PATTERN)
            .map_err(|e| EvalError::ConfigError(format!("invalid citation pattern: {}", e)))?;

        Ok(Self { refusals, citation })
    }

    pub fn is_refusal(&self, text: &str) -> bool {
        self.refusals.is_match(text)
    }

    pub fn has_citation(&self, text: &str) -> bool {
        self.citation.is_match(text)
    }

    pub fn classify(&self, answer: &str) -> AnswerClass {
        let answer = answer.trim();
        if self.is_refusal(answer) {
            AnswerClass::Refusal
        } else if self.has_citation(answer) {
            AnswerClass::Cited
        } else {
            AnswerClass::Hallucinated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::prompts::REFUSAL_SENTENCE;

    fn classifier() -> AnswerClassifier {
        AnswerClassifier::new().unwrap()
    }

    #[test]
    fn test_exact_refusal_sentence() {
        let c = classifier();
        assert!(c.is_refusal(REFUSAL_SENTENCE));
        assert_eq!(c.classify(REFUSAL_SENTENCE), AnswerClass::Refusal);
    }

    #[test]
    fn test_refusal_is_case_insensitive() {
        let c = classifier();
        assert!(c.is_refusal("Sorry, there is NOT ENOUGH INFORMATION here."));
        assert!(!c.is_refusal("The controller must keep records [2]."));
    }

    #[test]
    fn test_citations() {
        let c = classifier();
        assert!(c.has_citation("Fines apply [12]."));
        assert!(!c.has_citation("Fines apply [a]."));
        assert!(!c.has_citation("Fines apply []."));
    }

    #[test]
    fn test_refusal_wins_over_citation() {
        let c = classifier();
        assert_eq!(c.classify("Insufficient context to say more [1]."), AnswerClass::Refusal);
    }

    #[test]
    fn test_uncited_answer_is_hallucinated() {
        let c = classifier();
        assert_eq!(c.classify("Fines are 4% of turnover."), AnswerClass::Hallucinated);
        assert_eq!(c.classify("Fines are 4% of turnover [1]."), AnswerClass::Cited);
        assert_eq!(c.classify(""), AnswerClass::Hallucinated);
    }
}
