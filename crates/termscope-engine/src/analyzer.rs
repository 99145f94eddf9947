use std::collections::{BTreeMap, BTreeSet};

use termscope_ai::SemanticCapability;
use termscope_core::error::check_text;
use termscope_core::{
    AnalysisResult, ClassificationMethod, FlaggedSection, InputError, Match, Namespace, Segment,
    decode_text, normalize, segment,
};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::merge::merge;
use crate::patterns::match_patterns;
use crate::rules::{CategorySpec, DEFAULT_CATEGORIES, RuleBook};
use crate::score;
use crate::summary::summarize;

/// Characters of section text kept in a [`FlaggedSection`] excerpt.
const EXCERPT_CHARS: usize = 500;

/// Stateless document analyzer.
///
/// Holds the compiled rule book, the semantic backend (or its absence), and
/// the tunables. Everything is read-only after construction, so one analyzer
/// can serve concurrent `analyze` calls from any number of threads.
pub struct Analyzer {
    rules: RuleBook,
    semantic: SemanticCapability,
    config: EngineConfig,
}

impl Analyzer {
    /// Build with the default rule tables.
    pub fn new(config: EngineConfig, semantic: SemanticCapability) -> Result<Self, EngineError> {
        Self::with_rules(config, DEFAULT_CATEGORIES, semantic)
    }

    /// Regex rules only.
    pub fn pattern_only(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(config, SemanticCapability::Disabled)
    }

    pub fn with_rules(
        config: EngineConfig,
        categories: &[CategorySpec],
        semantic: SemanticCapability,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let rules = RuleBook::compile(categories)?.with_risk_weights(&config.risk_category_weights)?;

        let semantic = match semantic {
            SemanticCapability::Enabled(classifier) => {
                for (id, namespace) in classifier.categories() {
                    if rules.category(id).is_none_or(|c| c.namespace != namespace) {
                        return Err(EngineError::UnknownExemplarCategory(id.to_string()));
                    }
                }
                SemanticCapability::Enabled(
                    classifier
                        .with_threshold(config.ml_confidence_threshold)
                        .with_batch_size(config.embed_batch_size),
                )
            }
            SemanticCapability::Disabled => SemanticCapability::Disabled,
        };

        info!(
            categories = rules.categories().len(),
            semantic = semantic.is_enabled(),
            threshold = config.ml_confidence_threshold,
            "analyzer ready"
        );
        Ok(Self {
            rules,
            semantic,
            config,
        })
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn semantic_enabled(&self) -> bool {
        self.semantic.is_enabled()
    }

    /// Analyze a document.
    ///
    /// Fails only on input that is not text. Empty and whitespace-only input
    /// produce a valid result with no findings.
    pub fn analyze(&self, text: &str) -> Result<AnalysisResult, InputError> {
        self.analyze_document(None, text)
    }

    /// Analyze raw bytes, which must be UTF-8 text.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisResult, InputError> {
        self.analyze(decode_text(bytes)?)
    }

    /// Analyze a document and tag the result with a caller-supplied id.
    pub fn analyze_document(
        &self,
        document_id: Option<&str>,
        text: &str,
    ) -> Result<AnalysisResult, InputError> {
        check_text(text)?;
        let text = normalize(text);
        let segments = segment(&text);

        let (pattern_matches, semantic_matches) = rayon::join(
            || match_patterns(&self.rules, &segments),
            || self.semantic.classify(&segments),
        );
        let method = classification_method(&pattern_matches, semantic_matches.as_deref());
        debug!(
            segments = segments.len(),
            pattern = pattern_matches.len(),
            semantic = semantic_matches.as_ref().map(Vec::len),
            method = method.as_str(),
            "detectors finished"
        );

        let semantic_matches = semantic_matches.unwrap_or_default();
        let findings = merge(
            &self.rules,
            &pattern_matches,
            &semantic_matches,
            self.config.max_representative_matches,
        );

        let risk_score = score::risk_score(&findings.risk);
        let transparency_score = score::transparency_score(
            findings.dark_patterns.len(),
            findings.positive.len(),
            risk_score,
            &self.config.score_params(),
        )
        .round();

        let sentence_count = segments.iter().filter(|s| s.is_sentence()).count();
        let section_count = segments.iter().filter(|s| s.is_section()).count();
        let (readability_score, readability) = score::readability(&text, sentence_count);

        let flags = self.flags(pattern_matches.iter().chain(&semantic_matches));
        let total_flags = flags.len();
        let flagged_sections = flagged_sections(&segments, &flags);

        let executive_summary = summarize(&findings, risk_score, self.config.key_concern_limit);

        info!(
            document = document_id.unwrap_or("-"),
            risk_score,
            transparency_score,
            readability_score,
            method = method.as_str(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            document_id: document_id.map(str::to_string),
            risk_score,
            transparency_score,
            readability_score,
            readability,
            risk_breakdown: findings.risk,
            dark_patterns: findings.dark_patterns,
            positive_indicators: findings.positive,
            flagged_sections,
            total_flags,
            text_length: text.len(),
            section_count,
            sentence_count,
            executive_summary,
            classification_method: method,
        })
    }

    /// Distinct `(sentence, category)` pairs with risk or dark-pattern evidence.
    fn flags<'a>(&self, matches: impl Iterator<Item = &'a Match>) -> BTreeSet<(usize, &'a str)> {
        matches
            .filter(|m| {
                self.rules
                    .category(&m.category_id)
                    .is_some_and(|c| c.namespace != Namespace::Positive)
            })
            .map(|m| (m.segment_id, m.category_id.as_str()))
            .collect()
    }
}

/// `Pattern` when the semantic backend did not run. Otherwise `Semantic` if it
/// was the only detector to find anything, `Hybrid` if not.
fn classification_method(pattern: &[Match], semantic: Option<&[Match]>) -> ClassificationMethod {
    match semantic {
        None => ClassificationMethod::Pattern,
        Some(sem) if pattern.is_empty() && !sem.is_empty() => ClassificationMethod::Semantic,
        Some(_) => ClassificationMethod::Hybrid,
    }
}

/// Group flags by the section containing each sentence, in document order.
fn flagged_sections(segments: &[Segment], flags: &BTreeSet<(usize, &str)>) -> Vec<FlaggedSection> {
    let mut by_section: BTreeMap<usize, (BTreeSet<&str>, usize)> = BTreeMap::new();
    for &(sentence_id, category) in flags {
        let Some(section_id) = segments.get(sentence_id).and_then(|s| s.parent) else {
            continue;
        };
        let entry = by_section.entry(section_id).or_default();
        entry.0.insert(category);
        entry.1 += 1;
    }

    by_section
        .into_iter()
        .filter_map(|(section_id, (categories, flag_count))| {
            let section = segments.get(section_id)?;
            Some(FlaggedSection {
                section_id,
                start_offset: section.start_offset,
                end_offset: section.end_offset,
                excerpt: excerpt(&section.text),
                categories: categories.into_iter().map(str::to_string).collect(),
                flag_count,
            })
        })
        .collect()
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
