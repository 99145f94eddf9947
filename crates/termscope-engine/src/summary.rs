//! Plain-language executive summary.

use termscope_core::{CategoryFinding, KeyConcern, Severity, Summary, Verdict};

use crate::merge::MergedFindings;

struct Guidance {
    category_id: &'static str,
    impact: &'static str,
    recommendation: &'static str,
}

const RISK_GUIDANCE: &[Guidance] = &[
    Guidance {
        category_id: "data_sharing",
        impact: "Your personal data will be sold or shared with unknown third parties",
        recommendation: "Do not proceed unless you accept permanent loss of data privacy",
    },
    Guidance {
        category_id: "arbitration_waiver",
        impact: "You cannot sue this company in court, even for serious harm",
        recommendation: "Stop and consider: you lose most legal recourse if something goes wrong",
    },
    Guidance {
        category_id: "unilateral_changes",
        impact: "The company can change the rules at any time without asking you",
        recommendation: "Monitor for changes or set up alerts",
    },
    Guidance {
        category_id: "account_termination",
        impact: "The company can close your account instantly without explanation or appeal",
        recommendation: "Keep backups of your data before relying on this service",
    },
    Guidance {
        category_id: "liability_limitation",
        impact: "The company takes no responsibility if its service harms you",
        recommendation: "Consider whether the risk is worth the service benefits",
    },
    Guidance {
        category_id: "consent_by_default",
        impact: "Simply using the service counts as agreeing to everything in these terms",
        recommendation: "Read the terms before your first use, not after",
    },
];

const FALLBACK_RECOMMENDATION: &str = "Review this clause carefully";

/// Category-specific follow-ups, keyed by risk or dark-pattern category.
const NEXT_STEPS: &[(&str, &str)] = &[
    ("arbitration_waiver", "Remember: you cannot sue in court if problems arise"),
    ("data_sharing", "Check privacy settings immediately after signing up"),
    ("unilateral_changes", "Set up alerts for this company's policy changes"),
    ("auto_renewal", "Cancel the subscription before the renewal date if you want to stop"),
];

const GENERAL_NEXT_STEPS: &[&str] = &[
    "Keep screenshots of the current terms",
    "Monitor your account for unexpected changes",
    "Know your cancellation process before you need it",
];

const CRITICAL_ACTIONS: &[&str] = &[
    "Do not sign this agreement yet",
    "Get legal advice if the service is essential to you",
    "Look for alternative services with better terms",
    "Document what data you'll lose access to",
];

const CAUTION_ACTIONS: &[&str] = &[
    "Read every flagged section in detail",
    "Understand exactly what rights you're giving up",
    "Set up data export or backup before agreeing",
    "Check if you can negotiate better terms",
];

const ROUTINE_ACTIONS: &[&str] = &[
    "Save a copy of these terms for your records",
    "Review the flagged sections once more",
    "Set calendar reminders to check for term changes",
];

/// More moderate issues than this, with no critical one, calls for caution.
const CAUTION_MODERATE_COUNT: usize = 2;

/// Build the summary from merged findings.
///
/// Key concerns are the risk findings with the highest `weight × confidence`
/// (ties by category id), at most `key_concern_limit` of them. Every field is
/// a deterministic function of the inputs.
pub fn summarize(findings: &MergedFindings, risk_score: u32, key_concern_limit: usize) -> Summary {
    let overall_verdict = Verdict::from_risk_score(risk_score);

    let mut ranked: Vec<&CategoryFinding> = findings.risk.values().collect();
    // BTreeMap order is id-ascending and the sort is stable, so ties keep it.
    ranked.sort_by(|a, b| b.severity_score().total_cmp(&a.severity_score()));
    ranked.truncate(key_concern_limit);

    let (key_concerns, recommendations): (Vec<KeyConcern>, Vec<String>) = ranked
        .into_iter()
        .map(|f| {
            let guidance = RISK_GUIDANCE.iter().find(|g| g.category_id == f.category_id);
            let concern = KeyConcern {
                category_id: f.category_id.clone(),
                title: f.title.clone(),
                severity: f.severity,
                count: f.count,
                confidence: f.aggregate_confidence,
                impact: guidance.map_or_else(|| f.description.clone(), |g| g.impact.to_string()),
            };
            let recommendation = guidance.map_or(FALLBACK_RECOMMENDATION, |g| g.recommendation);
            (concern, recommendation.to_string())
        })
        .unzip();

    let (immediate_actions, bottom_line) = action_plan(findings);

    Summary {
        overall_verdict,
        headline: headline(overall_verdict).to_string(),
        key_concerns,
        recommendations,
        dark_pattern_alerts: dark_pattern_alerts(findings),
        strengths: findings
            .positive
            .values()
            .map(|f| format!("{}: {}", f.title, f.description))
            .collect(),
        next_steps: next_steps(findings),
        immediate_actions: immediate_actions.iter().map(|a| a.to_string()).collect(),
        bottom_line: bottom_line.to_string(),
    }
}

/// Issue counts by tier. Every risk finding is an issue; a dark pattern
/// only when it appears more than once.
fn issue_counts(findings: &MergedFindings) -> (usize, usize) {
    let issues = findings
        .risk
        .values()
        .chain(findings.dark_patterns.values().filter(|f| f.count > 1));
    issues.fold((0, 0), |(critical, moderate), f| {
        if f.severity == Severity::Critical {
            (critical + 1, moderate)
        } else {
            (critical, moderate + 1)
        }
    })
}

/// What to do before agreeing, and a one-line verdict on whether to agree.
fn action_plan(findings: &MergedFindings) -> (&'static [&'static str], &'static str) {
    match issue_counts(findings) {
        (1.., _) => (
            CRITICAL_ACTIONS,
            "Do not agree unless you fully understand and accept these major risks",
        ),
        (0, moderate) if moderate > CAUTION_MODERATE_COUNT => (
            CAUTION_ACTIONS,
            "Proceed with caution: consider alternatives with better terms",
        ),
        (0, 1..) => (
            ROUTINE_ACTIONS,
            "Acceptable: standard risks for this kind of service",
        ),
        (0, 0) => (ROUTINE_ACTIONS, "Safe to proceed: these terms respect user rights"),
    }
}

pub fn headline(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Low => "Low risk: no major red flags in these terms",
        Verdict::Medium => "Medium risk: several clauses favour the company over you",
        Verdict::High => "High risk: these terms ask you to give up significant rights",
    }
}

/// Dark patterns seen more than once. Critical ones come first.
fn dark_pattern_alerts(findings: &MergedFindings) -> Vec<String> {
    let mut repeated: Vec<&CategoryFinding> = findings
        .dark_patterns
        .values()
        .filter(|f| f.count > 1)
        .collect();
    repeated.sort_by_key(|f| f.severity != Severity::Critical);
    repeated
        .into_iter()
        .map(|f| {
            format!(
                "{} appears in {} places: {}",
                f.title,
                f.count,
                f.description.to_lowercase()
            )
        })
        .collect()
}

fn next_steps(findings: &MergedFindings) -> Vec<String> {
    NEXT_STEPS
        .iter()
        .filter(|(id, _)| findings.risk.contains_key(*id) || findings.dark_patterns.contains_key(*id))
        .map(|(_, step)| *step)
        .chain(GENERAL_NEXT_STEPS.iter().copied())
        .map(str::to_string)
        .collect()
}
