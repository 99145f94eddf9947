//! Regex scan of sentence segments against the compiled rule book.

use termscope_core::segment::sentences;
use termscope_core::{Flattened, Match, MatchSource, Segment};

use crate::rules::RuleBook;

/// Formal drafting markers. Any one of them in a sentence raises confidence.
pub const LEGAL_TERMS: &[&str] = &[
    "shall",
    "hereby",
    "whereas",
    "notwithstanding",
    "pursuant",
    "thereunder",
];

pub const MAX_PATTERN_CONFIDENCE: f32 = 0.95;

const LEGAL_TERM_BONUS: f32 = 0.10;
const MAX_SPECIFICITY_BONUS: f32 = 0.20;
const OVERLAP_BONUS_PER_RULE: f32 = 0.05;
const MAX_OVERLAP_BONUS: f32 = 0.15;

/// Run every rule of every category over every sentence.
///
/// Output order is sentence order, then category declaration order, then
/// rule order. Each rule contributes at most one match per sentence (its
/// leftmost hit).
pub fn match_patterns(rules: &RuleBook, segments: &[Segment]) -> Vec<Match> {
    let mut matches = Vec::new();

    for sentence in sentences(segments) {
        let flat = Flattened::new(&sentence.text);
        let legal = has_legal_term(&flat.text);

        for category in rules.categories() {
            let hits: Vec<_> = category
                .rules
                .iter()
                .filter_map(|rule| rule.pattern.find(&flat.text).map(|m| (rule, m)))
                .collect();
            let corroborating = hits.len().saturating_sub(1);

            for (rule, hit) in hits {
                let matched_text = hit.as_str();
                matches.push(Match {
                    category_id: category.id.clone(),
                    namespace: category.namespace,
                    segment_id: sentence.id,
                    offset: sentence.start_offset + flat.source_offset(hit.start()),
                    matched_text: matched_text.to_string(),
                    source: MatchSource::Pattern,
                    confidence: pattern_confidence(
                        rule.base_confidence,
                        matched_text.chars().count(),
                        legal,
                        corroborating,
                    ),
                });
            }
        }
    }

    matches
}

/// Confidence for one regex hit.
///
/// Starts from the rule's base, then adds up to 0.20 for span length (one
/// point per hundred characters), 0.10 when the sentence uses formal legal
/// drafting, and 0.05 per other rule of the same category that also fired in
/// the sentence, capped at 0.15. The result never exceeds
/// [`MAX_PATTERN_CONFIDENCE`].
pub fn pattern_confidence(
    base_confidence: f32,
    span_chars: usize,
    legal_terms: bool,
    corroborating_rules: usize,
) -> f32 {
    let specificity = (span_chars as f32 / 100.0).min(MAX_SPECIFICITY_BONUS);
    let legal = if legal_terms { LEGAL_TERM_BONUS } else { 0.0 };
    let overlap = (corroborating_rules as f32 * OVERLAP_BONUS_PER_RULE).min(MAX_OVERLAP_BONUS);
    (base_confidence + specificity + legal + overlap).clamp(0.0, MAX_PATTERN_CONFIDENCE)
}

fn has_legal_term(text: &str) -> bool {
    let lower = text.to_lowercase();
    LEGAL_TERMS.iter().any(|term| lower.contains(term))
}
