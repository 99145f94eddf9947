//! Numeric scores: risk, transparency, readability.

use std::sync::LazyLock;

use regex::Regex;
use termscope_core::ReadabilityMetrics;

use crate::merge::Findings;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));

/// Words that count as complex regardless of length.
pub const LEGAL_JARGON: &[&str] = &[
    "notwithstanding",
    "aforementioned",
    "heretofore",
    "hereafter",
    "pursuant",
    "thereto",
    "whereas",
    "indemnify",
    "arbitration",
    "jurisdiction",
    "covenant",
    "warranty",
    "liability",
    "statutory",
];

/// Words longer than this many characters count as complex.
const COMPLEX_WORD_CHARS: usize = 10;

/// Tunables for the transparency formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParams {
    pub dark_pattern_penalty: u32,
    pub positive_boost_per_indicator: u32,
    pub positive_boost_cap: u32,
    pub risk_transparency_factor: f64,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            dark_pattern_penalty: 8,
            positive_boost_per_indicator: 5,
            positive_boost_cap: 20,
            risk_transparency_factor: 0.25,
        }
    }
}

/// Contribution of one risk category: its full weight as soon as it has any
/// evidence, never more. Repetition does not escalate.
pub fn category_contribution(count: usize, weight: u32) -> u32 {
    (count as u64 * weight as u64).min(weight as u64) as u32
}

/// Sum of category contributions, saturating at 100.
pub fn risk_score(risk: &Findings) -> u32 {
    let total: u64 = risk
        .values()
        .map(|f| u64::from(category_contribution(f.count, f.weight)))
        .sum();
    total.min(100) as u32
}

/// Unrounded transparency score in `[0, 100]`.
///
/// Dark patterns and positive indicators count by category, not occurrence.
pub fn transparency_score(
    dark_pattern_categories: usize,
    positive_categories: usize,
    risk_score: u32,
    params: &ScoreParams,
) -> f64 {
    let penalty = dark_pattern_categories as f64 * params.dark_pattern_penalty as f64;
    let boost = (positive_categories as f64 * params.positive_boost_per_indicator as f64)
        .min(params.positive_boost_cap as f64);
    let base = 100.0 - penalty - risk_score as f64 * params.risk_transparency_factor;
    (base + boost).clamp(0.0, 100.0)
}

/// Readability score and the metrics it was computed from.
///
/// `100 - 2 × avg_sentence_length - complex_words_ratio`, clamped to
/// `[0, 100]` and rounded to one decimal. Text with no words scores 0.
pub fn readability(text: &str, sentence_count: usize) -> (f64, ReadabilityMetrics) {
    let lower = text.to_lowercase();
    let mut word_count = 0usize;
    let mut complex = 0usize;
    for word in WORD.find_iter(&lower).map(|m| m.as_str()) {
        word_count += 1;
        if word.chars().count() > COMPLEX_WORD_CHARS || LEGAL_JARGON.contains(&word) {
            complex += 1;
        }
    }

    if word_count == 0 {
        let metrics = ReadabilityMetrics {
            word_count: 0,
            sentence_count,
            avg_sentence_length: 0.0,
            complex_words_ratio: 0.0,
        };
        return (0.0, metrics);
    }

    let avg_sentence_length = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        word_count as f64
    };
    let complex_words_ratio = complex as f64 / word_count as f64 * 100.0;
    let score = (100.0 - avg_sentence_length * 2.0 - complex_words_ratio).clamp(0.0, 100.0);

    let metrics = ReadabilityMetrics {
        word_count,
        sentence_count,
        avg_sentence_length: round1(avg_sentence_length),
        complex_words_ratio: round1(complex_words_ratio),
    };
    (round1(score), metrics)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use termscope_core::{CategoryFinding, Namespace, Severity};

    fn finding(id: &str, weight: u32, count: usize) -> (String, CategoryFinding) {
        (
            id.to_string(),
            CategoryFinding {
                category_id: id.to_string(),
                namespace: Namespace::Risk,
                title: id.to_string(),
                description: String::new(),
                severity: Severity::Moderate,
                weight,
                count,
                corroborated: 0,
                representative_matches: vec![],
                aggregate_confidence: 0.8,
                confidence_band: None,
            },
        )
    }

    #[test]
    fn contribution_does_not_escalate() {
        assert_eq!(category_contribution(0, 20), 0);
        assert_eq!(category_contribution(1, 20), 20);
        assert_eq!(category_contribution(3, 20), 20);
    }

    #[test]
    fn risk_score_sums_and_saturates() {
        let one: Findings = [finding("arbitration_waiver", 20, 3)].into_iter().collect();
        assert_eq!(risk_score(&one), 20);

        let all: Findings = [
            finding("data_sharing", 25, 1),
            finding("arbitration_waiver", 20, 1),
            finding("unilateral_changes", 15, 2),
            finding("account_termination", 15, 1),
            finding("liability_limitation", 12, 1),
            finding("consent_by_default", 10, 4),
        ]
        .into_iter()
        .collect();
        assert_eq!(risk_score(&all), 97);

        let heavy: Findings = [finding("a", 60, 1), finding("b", 60, 1)].into_iter().collect();
        assert_eq!(risk_score(&heavy), 100);
    }

    #[test]
    fn oversized_weights_saturate_instead_of_wrapping() {
        let huge: Findings = [finding("a", u32::MAX, 1), finding("b", 1, 1)]
            .into_iter()
            .collect();
        assert_eq!(risk_score(&huge), 100);

        let all_max: Findings = (0..6)
            .map(|i| finding(&format!("c{i}"), u32::MAX, 2))
            .collect();
        assert_eq!(risk_score(&all_max), 100);
    }

    #[test]
    fn transparency_examples() {
        let p = ScoreParams::default();
        assert_eq!(transparency_score(0, 0, 0, &p), 100.0);
        assert_eq!(transparency_score(0, 0, 25, &p), 93.75);
        // 100 - 16 - 5 + 10
        assert_eq!(transparency_score(2, 2, 20, &p), 89.0);
        // Boost caps at 20 and the result at 100.
        assert_eq!(transparency_score(0, 10, 0, &p), 100.0);
        assert_eq!(transparency_score(12, 0, 100, &p), 0.0);
    }

    #[test]
    fn empty_text_reads_as_zero() {
        let (score, metrics) = readability("", 0);
        assert_eq!(score, 0.0);
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.avg_sentence_length, 0.0);
    }

    #[test]
    fn short_plain_sentences_read_well() {
        // 6 words over 2 sentences, none complex: 100 - 6 = 94.
        let (score, metrics) = readability("We sell data. You may leave.", 2);
        assert_eq!(metrics.word_count, 6);
        assert_eq!(metrics.avg_sentence_length, 3.0);
        assert_eq!(metrics.complex_words_ratio, 0.0);
        assert_eq!(score, 94.0);
    }

    #[test]
    fn jargon_counts_as_complex() {
        // 4 words, 2 complex (notwithstanding, arbitration): 100 - 8 - 50 = 42.
        let (score, metrics) = readability("Notwithstanding this, arbitration applies.", 1);
        assert_eq!(metrics.word_count, 4);
        assert_eq!(metrics.complex_words_ratio, 50.0);
        assert_eq!(score, 42.0);
    }

    #[test]
    fn readability_is_clamped() {
        let long = "word ".repeat(200);
        let (score, _) = readability(&long, 1);
        assert_eq!(score, 0.0);
    }
}
