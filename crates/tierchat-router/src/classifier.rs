// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical complexity scoring.
//!
//! Scores a message by counting keyword matches and question marks. No
//! model call, no network. The keyword sets mix English and Indonesian and
//! keep their duplicate entries; they are data, not an algorithm to tune.

use std::sync::LazyLock;

use regex::Regex;
use tierchat_config::RoutingConfig;

/// Mathematical, algorithmic and debugging vocabulary.
const HARD_KEYWORDS: &[&str] = &[
    r"derivative",
    r"integral",
    r"big-?o",
    r"complexity",
    r"algorithm",
    r"algoritma",
    r"mathematical",
    r"dynamic programming",
    r"regex",
    r"sql",
    r"stack trace",
    r"panic",
    r"traceback",
    r"recursion",
    r"algorithm",
    r"theorem",
    r"bukti",
    r"turunan",
    r"integral",
    r"induksi",
    r"np[-\s]?sulit",
    r"kompleksitas",
    r"pemrograman dinamis",
    r"jejak tumpukan",
    r"jejak kesalahan",
    r"jejak error",
    r"jejak",
    r"algoritma",
    r"teorema",
    r"persamaan",
    r"matematika",
    r"logika",
    r"berpikir keras",
    r"pikir keras",
    r"buktikan",
    r"soal sulit",
    r"tantangan",
    r"uji",
    r"uji coba",
    r"uji hipotesis",
    r"prima",
    r"prime",
];

/// Explanatory and troubleshooting intent phrases.
const MEDIUM_KEYWORDS: &[&str] = &[
    r"apa itu",
    r"jelaskan",
    r"analisa",
    r"penjelasan",
    r"mengapa",
    r"kenapa",
    r"sulit",
    r"tantangan",
    r"perbaiki",
    r"kesalahan",
    r"masalah",
    r"solusi",
    r"langkah",
    r"cara",
    r"bagaimana",
    r"penyebab",
    r"penyelesaian",
];

static HARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| build_pattern(HARD_KEYWORDS));
static MEDIUM_PATTERN: LazyLock<Regex> = LazyLock::new(|| build_pattern(MEDIUM_KEYWORDS));

fn build_pattern(keywords: &[&str]) -> Regex {
    Regex::new(&format!("(?i){}", keywords.join("|"))).expect("static keyword pattern")
}

/// Per-signal weights added to the base score of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub hard: u32,
    pub medium: u32,
    pub small: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hard: 5,
            medium: 3,
            small: 2,
        }
    }
}

impl From<&RoutingConfig> for ScoreWeights {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            hard: config.weight_hard,
            medium: config.weight_medium,
            small: config.weight_small,
        }
    }
}

/// How a score was reached, for the routing trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub hard_matches: u32,
    pub medium_matches: u32,
    pub question_marks: u32,
    pub score: u32,
}

/// Keyword and punctuation based complexity scorer.
#[derive(Debug, Clone, Default)]
pub struct ComplexityClassifier {
    weights: ScoreWeights,
}

impl ComplexityClassifier {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Score `text`. Always at least 1; unbounded above.
    pub fn score(&self, text: &str) -> u32 {
        self.breakdown(text).score
    }

    /// Score `text` and report each signal's match count.
    ///
    /// Matches are non-overlapping and case-insensitive; each alternation
    /// match counts once even when several keywords could have matched there.
    pub fn breakdown(&self, text: &str) -> ScoreBreakdown {
        let hard_matches = count(HARD_PATTERN.find_iter(text).count());
        let medium_matches = count(MEDIUM_PATTERN.find_iter(text).count());
        let question_marks = count(text.matches('?').count());

        let score = 1u32
            .saturating_add(self.weights.hard.saturating_mul(hard_matches))
            .saturating_add(self.weights.medium.saturating_mul(medium_matches))
            .saturating_add(self.weights.small.saturating_mul(question_marks));

        ScoreBreakdown {
            hard_matches,
            medium_matches,
            question_marks,
            score,
        }
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classifier() -> ComplexityClassifier {
        ComplexityClassifier::default()
    }

    #[test]
    fn empty_text_scores_base_only() {
        assert_eq!(classifier().score(""), 1);
    }

    #[test]
    fn plain_greeting_scores_base_only() {
        assert_eq!(classifier().score("hello there"), 1);
    }

    #[test]
    fn derivative_question_scores_eight() {
        let b = classifier().breakdown("What is a derivative?");
        assert_eq!(b.hard_matches, 1);
        assert_eq!(b.medium_matches, 0);
        assert_eq!(b.question_marks, 1);
        assert_eq!(b.score, 8);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classifier().score("DERIVATIVE"), 6);
        assert_eq!(classifier().score("Jelaskan"), 4);
    }

    #[test]
    fn each_match_counts_once() {
        // "integral" appears twice in the keyword list but one occurrence is one match.
        assert_eq!(classifier().breakdown("integral").hard_matches, 1);
        assert_eq!(classifier().breakdown("integral integral").hard_matches, 2);
    }

    #[test]
    fn indonesian_keywords_are_recognised() {
        let b = classifier().breakdown("bagaimana cara membuktikan teorema ini?");
        assert_eq!(b.medium_matches, 2);
        assert!(b.hard_matches >= 1);
    }

    #[test]
    fn np_hard_variants_match() {
        for text in ["np-sulit", "np sulit", "npsulit"] {
            assert_eq!(classifier().breakdown(text).hard_matches, 1, "{text}");
        }
    }

    #[test]
    fn custom_weights_apply() {
        let c = ComplexityClassifier::new(ScoreWeights {
            hard: 10,
            medium: 0,
            small: 1,
        });
        assert_eq!(c.score("sql??"), 13);
    }

    proptest! {
        #[test]
        fn score_is_at_least_one(text in ".*") {
            prop_assert!(classifier().score(&text) >= 1);
        }

        #[test]
        fn adding_question_marks_never_lowers_score(text in "[a-z ]{0,40}", extra in 1usize..5) {
            let base = classifier().score(&text);
            let more = format!("{text}{}", "?".repeat(extra));
            prop_assert!(classifier().score(&more) > base);
        }

        #[test]
        fn appending_hard_keyword_raises_score(text in "[a-z ]{0,40}") {
            let base = classifier().score(&text);
            let more = format!("{text} theorem");
            prop_assert!(classifier().score(&more) >= base + 5);
        }
    }
}
