//! Risk classification and scoring engine.
//!
//! `segment → {patterns, semantic} → merge → score → summarize`, driven by
//! [`Analyzer::analyze`].

mod analyzer;
mod config;
mod error;
pub mod merge;
pub mod patterns;
pub mod rules;
pub mod score;
pub mod summary;

pub use analyzer::Analyzer;
pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, RuleError};
pub use rules::{Category, CategorySpec, DEFAULT_CATEGORIES, RuleBook, RuleDefinition, RuleSpec};
