//! Report card rendering for analysis results.
//!
//! Groups the result into labelled sections: scores, summary, findings per
//! namespace, and flagged sections. Empty sections are skipped.

use std::collections::BTreeMap;

use termscope_core::{AnalysisResult, CategoryFinding, Namespace};
use termscope_engine::RuleBook;

const MAX_LIST_ITEMS: usize = 10;
const EXCERPT_PREVIEW_CHARS: usize = 120;

// ── Public API ──

/// Print an analysis result as a vertical report card.
pub fn print_report(result: &AnalysisResult) {
    let summary = &result.executive_summary;

    match &result.document_id {
        Some(id) => println!("=== {id} ==="),
        None => println!("=== Terms of Service Report ==="),
    }
    println!("{}", summary.headline);
    println!("{}", summary.bottom_line);
    println!();

    println!("Scores");
    field("risk", format!("{}/100 ({})", result.risk_score, summary.overall_verdict.as_str()));
    field("transparency", format!("{}/100", result.transparency_score));
    field("readability", format!("{:.1}/100", result.readability_score));
    field("method", result.classification_method.as_str());
    println!();

    println!("Document");
    field("characters", result.text_length);
    field("sections", result.section_count);
    field("sentences", result.sentence_count);
    field("words", result.readability.word_count);
    field("avg sentence length", format!("{:.1}", result.readability.avg_sentence_length));
    field("complex words", format!("{:.1}%", result.readability.complex_words_ratio));
    println!();

    if !summary.key_concerns.is_empty() {
        println!("Key Concerns");
        for (concern, recommendation) in summary.key_concerns.iter().zip(&summary.recommendations) {
            println!(
                "  {} [{}] x{} ({:.0}% confident)",
                concern.title,
                concern.severity.as_str(),
                concern.count,
                concern.confidence * 100.0
            );
            println!("    {}", concern.impact);
            println!("    -> {recommendation}");
        }
        println!();
    }

    print_list("Immediate Actions", &summary.immediate_actions);
    print_list("Dark Pattern Alerts", &summary.dark_pattern_alerts);
    print_list("Strengths", &summary.strengths);

    print_findings("Risk Breakdown", &result.risk_breakdown);
    print_findings("Dark Patterns", &result.dark_patterns);
    print_findings("Positive Indicators", &result.positive_indicators);

    if !result.flagged_sections.is_empty() {
        println!("Flagged Sections ({} flags)", result.total_flags);
        for section in result.flagged_sections.iter().take(MAX_LIST_ITEMS) {
            println!(
                "  #{:<4} {} [{}]",
                section.section_id,
                preview(&section.excerpt),
                section.categories.join(", ")
            );
        }
        more(result.flagged_sections.len());
        println!();
    }

    print_list("Next Steps", &summary.next_steps);
}

/// Print the rule categories grouped by namespace.
pub fn print_rules(rules: &RuleBook) {
    for namespace in Namespace::ALL {
        println!("{}", namespace_header(namespace));
        for category in rules.namespace(namespace) {
            println!(
                "  {:<26} {:<9} weight {:>3}  {} patterns",
                category.id,
                category.severity.as_str(),
                category.weight,
                category.rules.len()
            );
        }
        println!();
    }
}

// ── Section rendering ──

fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {label:<26} {value}");
}

fn print_list(header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{header}");
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("  - {item}");
    }
    more(items.len());
    println!();
}

fn print_findings(header: &str, findings: &BTreeMap<String, CategoryFinding>) {
    if findings.is_empty() {
        return;
    }
    println!("{header}");
    for finding in findings.values() {
        let band = finding
            .confidence_band
            .map_or("below floor", |b| b.as_str());
        println!(
            "  {:<26} x{:<3} confidence {:.2} ({band})",
            finding.title, finding.count, finding.aggregate_confidence
        );
        if let Some(best) = finding.representative_matches.first() {
            println!("  {:<26} \"{}\"", "", preview(&best.matched_text));
        }
    }
    println!();
}

fn namespace_header(namespace: Namespace) -> &'static str {
    match namespace {
        Namespace::Risk => "Risk Categories",
        Namespace::DarkPattern => "Dark Patterns",
        Namespace::Positive => "Positive Indicators",
    }
}

fn more(total: usize) {
    if total > MAX_LIST_ITEMS {
        println!("  ... and {} more", total - MAX_LIST_ITEMS);
    }
}

/// First line of `text`, cut to a readable width.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    match line.char_indices().nth(EXCERPT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}
