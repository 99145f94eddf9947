//! Combine pattern and semantic matches into one finding per category.
//!
//! Evidence is keyed by `(category, segment)`: when both detectors flag the
//! same sentence for the same category the higher-confidence match is kept and
//! the segment is counted once, as corroborated.

use std::collections::BTreeMap;

use termscope_core::{CategoryFinding, ConfidenceBand, Match, MatchSource, Namespace};
use tracing::warn;

use crate::rules::RuleBook;

pub type Findings = BTreeMap<String, CategoryFinding>;

/// Findings split by namespace, each keyed by category id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedFindings {
    pub risk: Findings,
    pub dark_patterns: Findings,
    pub positive: Findings,
}

impl MergedFindings {
    pub fn get(&self, namespace: Namespace) -> &Findings {
        match namespace {
            Namespace::Risk => &self.risk,
            Namespace::DarkPattern => &self.dark_patterns,
            Namespace::Positive => &self.positive,
        }
    }

    fn get_mut(&mut self, namespace: Namespace) -> &mut Findings {
        match namespace {
            Namespace::Risk => &mut self.risk,
            Namespace::DarkPattern => &mut self.dark_patterns,
            Namespace::Positive => &mut self.positive,
        }
    }
}

struct Evidence<'a> {
    best: &'a Match,
    pattern: bool,
    semantic: bool,
}

/// Merge both match streams.
///
/// Categories with no evidence are absent from the output. `count` is the
/// number of distinct segments with evidence. `aggregate_confidence` is the
/// mean of the per-segment best confidences. At most
/// `max_representative_matches` matches are kept per category, highest
/// confidence first with earlier offsets winning ties.
pub fn merge(
    rules: &RuleBook,
    pattern_matches: &[Match],
    semantic_matches: &[Match],
    max_representative_matches: usize,
) -> MergedFindings {
    let mut evidence: BTreeMap<&str, BTreeMap<usize, Evidence<'_>>> = BTreeMap::new();

    for m in pattern_matches.iter().chain(semantic_matches) {
        let entry = evidence
            .entry(m.category_id.as_str())
            .or_default()
            .entry(m.segment_id)
            .or_insert(Evidence {
                best: m,
                pattern: false,
                semantic: false,
            });
        match m.source {
            MatchSource::Pattern => entry.pattern = true,
            MatchSource::Semantic => entry.semantic = true,
        }
        if m.confidence > entry.best.confidence {
            entry.best = m;
        }
    }

    let mut merged = MergedFindings::default();

    for (category_id, by_segment) in evidence {
        let Some(category) = rules.category(category_id) else {
            warn!(category = category_id, "dropping matches for unknown category");
            continue;
        };

        let count = by_segment.len();
        let corroborated = by_segment.values().filter(|e| e.pattern && e.semantic).count();
        let aggregate_confidence =
            by_segment.values().map(|e| e.best.confidence).sum::<f32>() / count as f32;

        let mut representative: Vec<&Match> = by_segment.values().map(|e| e.best).collect();
        representative.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(a.offset.cmp(&b.offset))
        });
        representative.truncate(max_representative_matches);

        merged.get_mut(category.namespace).insert(
            category.id.clone(),
            CategoryFinding {
                category_id: category.id.clone(),
                namespace: category.namespace,
                title: category.title.clone(),
                description: category.description.clone(),
                severity: category.severity,
                weight: category.weight,
                count,
                corroborated,
                representative_matches: representative.into_iter().cloned().collect(),
                aggregate_confidence,
                confidence_band: ConfidenceBand::from_confidence(aggregate_confidence),
            },
        );
    }

    merged
}
