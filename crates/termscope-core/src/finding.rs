//! Detection events and per-category findings.
//!
//! A [`Match`] is one observation by one detector; a [`CategoryFinding`] is
//! the merged view of every match for a category across the document.

use serde::{Deserialize, Serialize};

/// The three disjoint rule namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Legally risky clauses; these drive the risk score.
    Risk,
    /// Manipulative drafting; penalises transparency only.
    DarkPattern,
    /// User-favourable practices; boosts transparency.
    Positive,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Self::Risk, Self::DarkPattern, Self::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Risk => "risk",
            Self::DarkPattern => "dark_pattern",
            Self::Positive => "positive",
        }
    }
}

/// Which detector produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Pattern,
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Moderate,
    /// Positive indicators.
    Good,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Moderate => "moderate",
            Self::Good => "good",
        }
    }
}

/// Reporting band for classifier confidence. Never used in score arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    /// `[0.70, 0.80)`
    Low,
    /// `[0.80, 0.90)`
    Medium,
    /// `[0.90, 1.0]`
    High,
}

impl ConfidenceBand {
    /// Band for a confidence value, or `None` below the 0.70 reporting floor.
    pub fn from_confidence(confidence: f32) -> Option<Self> {
        match confidence {
            c if c >= 0.90 => Some(Self::High),
            c if c >= 0.80 => Some(Self::Medium),
            c if c >= 0.70 => Some(Self::Low),
            _ => None,
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

/// A single detection event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub category_id: String,
    pub namespace: Namespace,
    /// Id of the sentence segment the match was found in.
    pub segment_id: usize,
    /// Byte offset of the evidence in the normalized text: the start of the
    /// regex hit for pattern matches, the sentence start for semantic ones.
    pub offset: usize,
    pub matched_text: String,
    pub source: MatchSource,
    /// In `[0, 1]`.
    pub confidence: f32,
}

/// Merged evidence for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFinding {
    pub category_id: String,
    pub namespace: Namespace,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub weight: u32,
    /// Distinct segments with at least one match.
    pub count: usize,
    /// Segments where both detectors agreed.
    pub corroborated: usize,
    /// Most confident first, capped by configuration.
    pub representative_matches: Vec<Match>,
    pub aggregate_confidence: f32,
    pub confidence_band: Option<ConfidenceBand>,
}

impl CategoryFinding {
    /// Ranking key for the executive summary.
    pub fn severity_score(&self) -> f32 {
        self.weight as f32 * self.aggregate_confidence
    }
}
