//! Representative sentences defining each category's semantic centroid.
//!
//! Risk categories and positive indicators carry exemplars; dark patterns are
//! left to the rule engine.

use termscope_core::Namespace;

/// Example sentences for one category.
#[derive(Debug, Clone, Copy)]
pub struct Exemplar {
    pub category_id: &'static str,
    pub namespace: Namespace,
    pub sentences: &'static [&'static str],
}

/// Built-in exemplar table, in declaration order.
pub const DEFAULT_EXEMPLARS: &[Exemplar] = &[
    Exemplar {
        category_id: "data_sharing",
        namespace: Namespace::Risk,
        sentences: &[
            "We may share your personal information with third parties for marketing purposes",
            "Your data may be disclosed to our partners and affiliates",
            "We sell personal information to advertising companies",
            "Information shared with business partners for commercial use",
        ],
    },
    Exemplar {
        category_id: "arbitration_waiver",
        namespace: Namespace::Risk,
        sentences: &[
            "All disputes must be resolved through binding arbitration",
            "You waive your right to a jury trial",
            "Class action waiver and individual arbitration requirement",
            "Mandatory arbitration clause limiting legal rights",
        ],
    },
    Exemplar {
        category_id: "unilateral_changes",
        namespace: Namespace::Risk,
        sentences: &[
            "We reserve the right to modify these terms at any time",
            "Terms may be updated without prior notice to users",
            "Company may change agreement unilaterally at sole discretion",
            "Modifications effective immediately upon posting",
        ],
    },
    Exemplar {
        category_id: "account_termination",
        namespace: Namespace::Risk,
        sentences: &[
            "We may suspend or terminate your account at any time",
            "Service termination without cause or notice",
            "Immediate account closure at company discretion",
            "User access may be revoked without explanation",
        ],
    },
    Exemplar {
        category_id: "liability_limitation",
        namespace: Namespace::Risk,
        sentences: &[
            "Company is not liable for any damages arising from service use",
            "We disclaim all warranties and limit maximum liability",
            "User assumes all risks of service usage",
            "No responsibility for indirect or consequential damages",
        ],
    },
    Exemplar {
        category_id: "user_rights",
        namespace: Namespace::Positive,
        sentences: &[
            "You have the right to access your personal data",
            "Users may request deletion of their information",
            "Data portability rights are provided to users",
            "Right to opt out of data processing",
        ],
    },
    Exemplar {
        category_id: "transparency",
        namespace: Namespace::Positive,
        sentences: &[
            "We will provide clear notice of any changes",
            "Users will be informed of policy updates",
            "Transparent communication about data usage",
            "Clear explanation of terms in plain language",
        ],
    },
    Exemplar {
        category_id: "data_protection",
        namespace: Namespace::Positive,
        sentences: &[
            "Your data is encrypted and securely stored",
            "Strong security measures protect user information",
            "GDPR compliant data processing practices",
            "Privacy by design principles are followed",
        ],
    },
];
