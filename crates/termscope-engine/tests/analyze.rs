use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use termscope_ai::{Exemplar, SemanticCapability, SemanticClassifier, TextEncoder};
use termscope_core::{ClassificationMethod, InputError, MatchSource, Namespace, Verdict};
use termscope_engine::{Analyzer, EngineConfig, EngineError};

const SHARING: &str = "We may share your personal information with third parties for marketing.";

const ALL_RISKS: &str = "\
We may share your personal information with third parties.
All disputes are resolved through binding arbitration.
We reserve the right to modify these terms at any time.
We may suspend or terminate your account at any time without notice.
We are not liable for any damages arising from your use.
By using this service you agree to these terms.
";

fn patterns() -> Analyzer {
    Analyzer::pattern_only(EngineConfig::default()).unwrap()
}

/// Two-dimensional encoder: termination vocabulary on one axis, everything
/// else on the other. Can be switched into a failing state after build.
struct TerminationEncoder {
    broken: AtomicBool,
}

impl TerminationEncoder {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            broken: AtomicBool::new(false),
        })
    }
}

impl TextEncoder for TerminationEncoder {
    fn dim(&self) -> usize {
        2
    }

    fn encode_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::ensure!(!self.broken.load(Ordering::SeqCst), "encoder offline");
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                if ["terminat", "closure", "suspend"].iter().any(|k| lower.contains(k)) {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }
}

const TERMINATION_EXEMPLARS: &[Exemplar] = &[Exemplar {
    category_id: "account_termination",
    namespace: Namespace::Risk,
    sentences: &["Account termination", "Account closure"],
}];

fn semantic(encoder: Arc<TerminationEncoder>) -> Analyzer {
    let classifier = SemanticClassifier::build(encoder, TERMINATION_EXEMPLARS).unwrap();
    Analyzer::new(EngineConfig::default(), SemanticCapability::Enabled(classifier)).unwrap()
}

#[test]
fn empty_document() {
    for text in ["", "   \n\n\t  "] {
        let result = patterns().analyze(text).unwrap();
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.transparency_score, 100.0);
        assert_eq!(result.readability_score, 0.0);
        assert!(result.risk_breakdown.is_empty());
        assert!(result.dark_patterns.is_empty());
        assert!(result.positive_indicators.is_empty());
        assert_eq!(result.sentence_count, 0);
        assert_eq!(result.total_flags, 0);
        assert_eq!(result.executive_summary.overall_verdict, Verdict::Low);
        assert_eq!(result.classification_method, ClassificationMethod::Pattern);
    }
}

#[test]
fn single_data_sharing_clause() {
    let result = patterns().analyze(SHARING).unwrap();
    assert_eq!(result.risk_score, 25);
    assert_eq!(result.transparency_score, 94.0);
    assert_eq!(result.risk_breakdown.len(), 1);
    let finding = &result.risk_breakdown["data_sharing"];
    assert_eq!(finding.count, 1);
    assert!(finding.aggregate_confidence >= 0.7);
    assert_eq!(result.executive_summary.key_concerns.len(), 1);
    assert_eq!(result.executive_summary.key_concerns[0].category_id, "data_sharing");
    assert_eq!(result.executive_summary.overall_verdict, Verdict::Low);
}

#[test]
fn hard_wrapped_clause_still_matches() {
    let wrapped = "We may share your personal information\nwith third parties for marketing.";
    let result = patterns().analyze(wrapped).unwrap();
    assert_eq!(result.sentence_count, 1);
    assert_eq!(result.risk_score, 25);
    assert_eq!(result.transparency_score, 94.0);
    let finding = &result.risk_breakdown["data_sharing"];
    assert_eq!(finding.count, 1);
    let m = &finding.representative_matches[0];
    assert!(!m.matched_text.contains('\n'));
    assert!(wrapped[m.offset..].starts_with("We may share") || wrapped[m.offset..].starts_with("share"));
}

#[test]
fn repeated_category_does_not_escalate() {
    let text = "All disputes are subject to binding arbitration. \
                Binding arbitration applies to every claim. \
                You agree to mandatory arbitration.";
    let result = patterns().analyze(text).unwrap();
    assert_eq!(result.risk_breakdown["arbitration_waiver"].count, 3);
    assert_eq!(result.risk_score, 20);
    assert_eq!(result.risk_breakdown.len(), 1);
}

#[test]
fn every_risk_category_sums_to_97() {
    let result = patterns().analyze(ALL_RISKS).unwrap();
    assert_eq!(result.risk_breakdown.len(), 6);
    assert_eq!(result.risk_score, 97);
    assert_eq!(result.executive_summary.overall_verdict, Verdict::High);
    assert_eq!(result.executive_summary.key_concerns.len(), 3);

    // Doubling the document changes counts, not the score.
    let doubled = patterns().analyze(&ALL_RISKS.repeat(2)).unwrap();
    assert_eq!(doubled.risk_score, 97);
}

#[test]
fn risk_is_monotonic_in_added_evidence() {
    let base = patterns().analyze(SHARING).unwrap();
    let extended = patterns()
        .analyze(&format!(
            "{SHARING} We may terminate your account at any time without notice."
        ))
        .unwrap();
    assert!(extended.risk_score >= base.risk_score);
    assert_eq!(extended.risk_score, 40);
    assert!(extended.transparency_score <= base.transparency_score);
}

#[test]
fn scores_stay_in_bounds() {
    let noisy = format!(
        "{} Limited time offer, act now or lose it! Additional fees may apply. \
         Notwithstanding the foregoing, heretofore and hereafter. \
         To opt out you must contact us by mail. Your subscription will automatically renew. \
         We collect device information and track your browsing.",
        ALL_RISKS.repeat(3)
    );
    let result = patterns().analyze(&noisy).unwrap();
    assert!(result.risk_score <= 100);
    assert!((0.0..=100.0).contains(&result.transparency_score));
    assert!((0.0..=100.0).contains(&result.readability_score));
    for finding in result
        .risk_breakdown
        .values()
        .chain(result.dark_patterns.values())
        .chain(result.positive_indicators.values())
    {
        assert!((0.0..=1.0).contains(&finding.aggregate_confidence));
        assert!(finding.representative_matches.len() <= 5);
        assert!(finding.count >= finding.representative_matches.len());
    }
    assert!(!result.dark_patterns.is_empty());
    assert!(result.transparency_score < 76.0);
}

#[test]
fn analysis_is_deterministic() {
    let analyzer = patterns();
    let a = analyzer.analyze(ALL_RISKS).unwrap();
    let b = analyzer.analyze(ALL_RISKS).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn concurrent_calls_match_sequential() {
    let analyzer = patterns();
    let expected = analyzer.analyze(ALL_RISKS).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| analyzer.analyze(ALL_RISKS).unwrap())).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn binary_input_is_rejected() {
    assert_eq!(
        patterns().analyze("terms\0of service"),
        Err(InputError::BinaryContent { offset: 5 })
    );
}

#[test]
fn semantic_only_finding() {
    // No regex matches this sentence.
    let result = semantic(TerminationEncoder::new())
        .analyze("Service termination without cause or notice.")
        .unwrap();
    assert_eq!(result.classification_method, ClassificationMethod::Semantic);
    assert_eq!(result.risk_score, 15);
    let finding = &result.risk_breakdown["account_termination"];
    assert_eq!(finding.count, 1);
    assert_eq!(finding.corroborated, 0);
    assert_eq!(finding.representative_matches[0].source, MatchSource::Semantic);
}

#[test]
fn corroborated_sentence_counts_once() {
    let result = semantic(TerminationEncoder::new())
        .analyze("We may suspend or terminate your account at any time.")
        .unwrap();
    assert_eq!(result.classification_method, ClassificationMethod::Hybrid);
    let finding = &result.risk_breakdown["account_termination"];
    assert_eq!(finding.count, 1);
    assert_eq!(finding.corroborated, 1);
    assert_eq!(result.risk_score, 15);
}

#[test]
fn failing_backend_degrades_to_patterns() {
    let encoder = TerminationEncoder::new();
    let analyzer = semantic(Arc::clone(&encoder));
    encoder.broken.store(true, Ordering::SeqCst);

    let degraded = analyzer.analyze(ALL_RISKS).unwrap();
    let baseline = patterns().analyze(ALL_RISKS).unwrap();
    assert_eq!(degraded.classification_method, ClassificationMethod::Pattern);
    assert_eq!(degraded.risk_score, baseline.risk_score);
    assert_eq!(degraded.risk_breakdown, baseline.risk_breakdown);
}

#[test]
fn exemplar_categories_must_exist() {
    const STRAY: &[Exemplar] = &[Exemplar {
        category_id: "not_a_rule",
        namespace: Namespace::Risk,
        sentences: &["termination"],
    }];
    let classifier = SemanticClassifier::build(TerminationEncoder::new(), STRAY).unwrap();
    let err = Analyzer::new(EngineConfig::default(), SemanticCapability::Enabled(classifier));
    assert!(matches!(err, Err(EngineError::UnknownExemplarCategory(id)) if id == "not_a_rule"));
}

#[test]
fn configured_weights_change_the_score() {
    let config = EngineConfig::from_toml_str("[risk_category_weights]\ndata_sharing = 40\n").unwrap();
    let result = Analyzer::pattern_only(config).unwrap().analyze(SHARING).unwrap();
    assert_eq!(result.risk_score, 40);
    assert_eq!(result.risk_breakdown["data_sharing"].weight, 40);
}

#[test]
fn unknown_weight_category_fails_construction() {
    let config = EngineConfig::from_toml_str("[risk_category_weights]\nnope = 1\n").unwrap();
    assert!(matches!(
        Analyzer::pattern_only(config),
        Err(EngineError::Config(_))
    ));
}

#[test]
fn huge_configured_weights_saturate() {
    let config = EngineConfig::from_toml_str(
        "[risk_category_weights]\ndata_sharing = 4294967295\narbitration_waiver = 1\n",
    )
    .unwrap();
    let text = "We may share your personal information with third parties.\n\
                All disputes are resolved through binding arbitration.";
    let result = Analyzer::pattern_only(config).unwrap().analyze(text).unwrap();
    assert_eq!(result.risk_score, 100);
    assert_eq!(result.executive_summary.overall_verdict, Verdict::High);
    assert_eq!(result.transparency_score, 75.0);
}

const SHARING_WITH_RIGHTS: &str = "We may share your personal information with third parties for marketing. \
     You have the right to request deletion of your data.";

#[test]
fn positive_indicator_raises_transparency() {
    let result = patterns().analyze(SHARING_WITH_RIGHTS).unwrap();
    assert!(result.positive_indicators.contains_key("user_rights"));
    assert_eq!(result.risk_score, 25);
    // 100 - 6.25 + 5
    assert_eq!(result.transparency_score, 99.0);
    assert!(result.transparency_score > patterns().analyze(SHARING).unwrap().transparency_score);
}

#[test]
fn configured_dark_pattern_penalty_reaches_analysis() {
    let renewal = "Your subscription will automatically renew each month.";
    assert_eq!(patterns().analyze(renewal).unwrap().transparency_score, 92.0);

    let config = EngineConfig::from_toml_str("dark_pattern_penalty = 20").unwrap();
    let result = Analyzer::pattern_only(config).unwrap().analyze(renewal).unwrap();
    assert!(result.dark_patterns.contains_key("auto_renewal"));
    assert_eq!(result.transparency_score, 80.0);
}

#[test]
fn configured_boost_cap_reaches_analysis() {
    let config = EngineConfig::from_toml_str("positive_boost_cap = 0").unwrap();
    let result = Analyzer::pattern_only(config)
        .unwrap()
        .analyze(SHARING_WITH_RIGHTS)
        .unwrap();
    assert!(result.positive_indicators.contains_key("user_rights"));
    assert_eq!(result.transparency_score, 94.0);
}

#[test]
fn immediate_actions_follow_issue_severity() {
    let critical = patterns().analyze(SHARING).unwrap().executive_summary;
    assert_eq!(critical.immediate_actions[0], "Do not sign this agreement yet");
    assert!(critical.bottom_line.starts_with("Do not agree"));

    let moderate = "We reserve the right to modify these terms at any time.\n\
                    We may suspend or terminate your account at any time without notice.\n\
                    By using this service you agree to these terms.";
    let caution = patterns().analyze(moderate).unwrap().executive_summary;
    assert_eq!(caution.immediate_actions.len(), 4);
    assert!(caution.bottom_line.starts_with("Proceed with caution"));

    let clean = patterns().analyze("The weather was pleasant.").unwrap().executive_summary;
    assert_eq!(clean.immediate_actions.len(), 3);
    assert!(clean.bottom_line.starts_with("Safe to proceed"));
}
