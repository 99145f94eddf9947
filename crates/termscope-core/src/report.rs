//! The analysis record handed back to collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::finding::{CategoryFinding, Severity};

/// Which detectors contributed to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    /// Regex rules only; the semantic backend was disabled or unavailable.
    Pattern,
    /// The semantic classifier ran and was the only source of findings.
    Semantic,
    /// Both detectors ran.
    Hybrid,
}

impl ClassificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Semantic => "semantic",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Overall risk tier, a pure function of the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Low,
    Medium,
    High,
}

impl Verdict {
    pub fn from_risk_score(risk_score: u32) -> Self {
        match risk_score {
            0..30 => Self::Low,
            30..70 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyConcern {
    pub category_id: String,
    pub title: String,
    pub severity: Severity,
    pub count: usize,
    pub confidence: f32,
    /// What the clause means for the user.
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub overall_verdict: Verdict,
    pub headline: String,
    /// Highest `weight × confidence` first.
    pub key_concerns: Vec<KeyConcern>,
    /// `recommendations[i]` answers `key_concerns[i]`.
    pub recommendations: Vec<String>,
    pub dark_pattern_alerts: Vec<String>,
    pub strengths: Vec<String>,
    pub next_steps: Vec<String>,
    /// What to do before agreeing, chosen by the most severe tier of issue found.
    pub immediate_actions: Vec<String>,
    pub bottom_line: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub complex_words_ratio: f64,
}

/// A section that produced risk or dark-pattern evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedSection {
    pub section_id: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub excerpt: String,
    pub categories: Vec<String>,
    pub flag_count: usize,
}

/// Immutable result of one analysis call. Self-contained: nothing in it
/// points back into the caller's storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub document_id: Option<String>,
    /// In `[0, 100]`.
    pub risk_score: u32,
    /// In `[0, 100]`, rounded to an integer.
    pub transparency_score: f64,
    /// In `[0, 100]`, rounded to one decimal.
    pub readability_score: f64,
    pub readability: ReadabilityMetrics,
    pub risk_breakdown: BTreeMap<String, CategoryFinding>,
    pub dark_patterns: BTreeMap<String, CategoryFinding>,
    pub positive_indicators: BTreeMap<String, CategoryFinding>,
    pub flagged_sections: Vec<FlaggedSection>,
    pub total_flags: usize,
    pub text_length: usize,
    pub section_count: usize,
    pub sentence_count: usize,
    pub executive_summary: Summary,
    pub classification_method: ClassificationMethod,
}
