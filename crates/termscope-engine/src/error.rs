use std::path::PathBuf;

use thiserror::Error;

/// A rule table that cannot be compiled. Raised at construction, never per document.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern #{index} in category {category}: {source}")]
    InvalidPattern {
        category: String,
        index: usize,
        source: regex::Error,
    },

    #[error("category {0} is declared more than once")]
    DuplicateCategory(String),

    #[error("category {0} has no rules")]
    EmptyRuleSet(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown risk category in weights: {0}")]
    UnknownCategory(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("semantic exemplar category {0} has no matching rule category")]
    UnknownExemplarCategory(String),
}
