//! Declarative rule tables and their compiled form.
//!
//! Each category declares its namespace, weight, and an ordered list of
//! case-insensitive patterns. Broad phrasings carry the default base
//! confidence; the longer multi-clause patterns are more specific and start
//! higher. Compilation happens once, when an [`Analyzer`](crate::Analyzer) is
//! built.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use termscope_core::{Namespace, Severity};
use tracing::debug;

use crate::error::{ConfigError, RuleError};

/// Base confidence for a pattern that does not declare its own.
pub const DEFAULT_BASE_CONFIDENCE: f32 = 0.70;

/// Weight applied to every dark-pattern and positive category. Those
/// namespaces feed the transparency score by category count, so the weight
/// only orders them in the summary.
const FLAT_WEIGHT: u32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub pattern: &'static str,
    pub base_confidence: f32,
}

const fn broad(pattern: &'static str) -> RuleSpec {
    RuleSpec {
        pattern,
        base_confidence: DEFAULT_BASE_CONFIDENCE,
    }
}

const fn specific(pattern: &'static str, base_confidence: f32) -> RuleSpec {
    RuleSpec {
        pattern,
        base_confidence,
    }
}

/// Uncompiled category declaration.
#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub id: &'static str,
    pub namespace: Namespace,
    pub title: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub weight: u32,
    pub rules: &'static [RuleSpec],
}

/// The built-in table. Declaration order is the order categories are
/// scanned in and the order `rules` lists them in.
pub const DEFAULT_CATEGORIES: &[CategorySpec] = &[
    // -- Risk ---------------------------------------------------------------
    CategorySpec {
        id: "data_sharing",
        namespace: Namespace::Risk,
        title: "Data Sharing",
        description: "Data sharing with third parties",
        severity: Severity::Critical,
        weight: 25,
        rules: &[
            broad(r"(?i)we may share.*?information.*?with.*?third parties"),
            broad(r"(?i)your data.*?may be.*?disclosed.*?to.*?partners"),
            broad(r"(?i)information.*?shared.*?with.*?affiliates"),
            broad(r"(?i)sell.*?personal.*?information"),
            broad(r"(?i)transfer.*?data.*?to.*?other.*?companies"),
            broad(r"(?i)provide.*?information.*?to.*?advertisers"),
            specific(
                r"(?i)(?:share|sell|transfer|disclose|provide).*?(?:personal|private|user).*?(?:information|data).*?(?:third parties|partners|affiliates|advertisers|vendors)",
                0.90,
            ),
            specific(
                r"(?i)(?:your|user).*?(?:information|data).*?(?:may be|will be|can be).*?(?:shared|disclosed|sold|transferred).*?(?:to|with)",
                0.90,
            ),
            specific(
                r"(?i)(?:marketing|advertising|commercial).*?(?:partners|companies).*?(?:receive|access).*?(?:your|user).*?(?:information|data)",
                0.90,
            ),
            specific(
                r"(?i)(?:business|corporate).*?(?:sale|merger|acquisition|transfer).*?(?:personal|user).*?(?:information|data)",
                0.90,
            ),
        ],
    },
    CategorySpec {
        id: "arbitration_waiver",
        namespace: Namespace::Risk,
        title: "Arbitration Waiver",
        description: "Arbitration clauses that limit legal rights",
        severity: Severity::Critical,
        weight: 20,
        rules: &[
            broad(r"(?i)binding.*?arbitration"),
            broad(r"(?i)waive.*?right.*?to.*?jury.*?trial"),
            broad(r"(?i)class.*?action.*?waiver"),
            broad(r"(?i)individual.*?arbitration.*?only"),
            broad(r"(?i)resolve.*?disputes.*?through.*?arbitration"),
            broad(r"(?i)mandatory.*?arbitration"),
            specific(
                r"(?i)(?:binding|mandatory|required).*?arbitration.*?(?:waive|waiver|give up|forfeit).*?(?:right|rights).*?(?:jury|court|class action)",
                0.85,
            ),
            specific(
                r"(?i)(?:agree|consent).*?(?:binding|mandatory).*?arbitration.*?(?:individual|one-on-one|private).*?basis",
                0.85,
            ),
            specific(
                r"(?i)(?:class action|collective action).*?(?:waiver|waive|prohibited|forbidden|not permitted)",
                0.85,
            ),
            specific(
                r"(?i)(?:disputes|claims|disagreements).*?(?:resolved|settled|decided).*?(?:exclusively|only).*?(?:through|via|by).*?arbitration",
                0.85,
            ),
        ],
    },
    CategorySpec {
        id: "unilateral_changes",
        namespace: Namespace::Risk,
        title: "Unilateral Changes",
        description: "Unilateral right to change terms",
        severity: Severity::Moderate,
        weight: 15,
        rules: &[
            broad(r"(?i)we.*?reserve.*?the.*?right.*?to.*?modify"),
            broad(r"(?i)may.*?change.*?these.*?terms.*?at.*?any.*?time"),
            broad(r"(?i)update.*?terms.*?without.*?notice"),
            broad(r"(?i)sole.*?discretion.*?to.*?change"),
            broad(r"(?i)modify.*?agreement.*?unilaterally"),
            specific(
                r"(?i)(?:reserve|retain).*?(?:right|ability|option).*?(?:modify|change|update|alter).*?(?:terms|agreement|policy).*?(?:any time|anytime|without notice)",
                0.80,
            ),
            specific(
                r"(?i)(?:terms|agreement|policy).*?(?:may be|can be|will be).*?(?:changed|modified|updated).*?(?:unilaterally|at will|sole discretion)",
                0.80,
            ),
            specific(
                r"(?i)(?:continued|ongoing).*?(?:use|access).*?(?:constitutes|means|implies).*?(?:acceptance|agreement).*?(?:changes|modifications)",
                0.80,
            ),
            specific(
                r"(?i)(?:posting|publication).*?(?:revised|updated|new).*?(?:terms|policy).*?(?:effective|binding).*?(?:immediately|upon posting)",
                0.80,
            ),
        ],
    },
    CategorySpec {
        id: "account_termination",
        namespace: Namespace::Risk,
        title: "Account Termination",
        description: "Unfair account termination clauses",
        severity: Severity::Moderate,
        weight: 15,
        rules: &[
            broad(r"(?i)suspend.*?terminate.*?account.*?at.*?any.*?time"),
            broad(r"(?i)discontinue.*?service.*?without.*?notice"),
            broad(r"(?i)sole.*?discretion.*?to.*?terminate"),
            broad(r"(?i)ban.*?user.*?without.*?cause"),
            broad(r"(?i)immediate.*?termination.*?without.*?warning"),
            specific(
                r"(?i)(?:terminate|suspend|close|disable).*?(?:account|access|service).*?(?:any time|anytime|immediately).*?(?:without|no).*?(?:notice|warning|cause|reason)",
                0.75,
            ),
            specific(
                r"(?i)(?:sole|absolute|complete).*?(?:discretion|judgment).*?(?:terminate|suspend|ban).*?(?:user|account|access)",
                0.75,
            ),
            specific(
                r"(?i)(?:reserves|retains).*?(?:right|ability).*?(?:refuse|deny|revoke).*?(?:service|access).*?(?:any reason|no reason)",
                0.75,
            ),
            specific(
                r"(?i)(?:immediate|instant).*?(?:termination|suspension).*?(?:violation|breach).*?(?:suspected|alleged)",
                0.75,
            ),
        ],
    },
    CategorySpec {
        id: "liability_limitation",
        namespace: Namespace::Risk,
        title: "Liability Limitation",
        description: "Broad liability limitations",
        severity: Severity::Moderate,
        weight: 12,
        rules: &[
            broad(r"(?i)not.*?liable.*?for.*?any.*?damages"),
            broad(r"(?i)disclaim.*?all.*?warranties"),
            broad(r"(?i)use.*?at.*?your.*?own.*?risk"),
            broad(r"(?i)no.*?responsibility.*?for.*?content"),
            broad(r"(?i)maximum.*?liability.*?limited.*?to"),
            specific(
                r"(?i)(?:not liable|no liability|disclaim.*?liability).*?(?:any|all).*?(?:damages|losses|harm|injury).*?(?:direct|indirect|incidental|consequential)",
                0.70,
            ),
            specific(
                r"(?i)(?:maximum|total).*?liability.*?(?:limited|capped|restricted).*?(?:amount paid|fees paid|\$\d+)",
                0.70,
            ),
            specific(
                r"(?i)(?:use.*?at.*?own.*?risk|as-is|without.*?warranty).*?(?:disclaim|exclude).*?(?:warranties|guarantees)",
                0.70,
            ),
            specific(
                r"(?i)(?:force majeure|act of god|circumstances beyond control).*?(?:not responsible|no liability)",
                0.70,
            ),
        ],
    },
    CategorySpec {
        id: "consent_by_default",
        namespace: Namespace::Risk,
        title: "Consent by Default",
        description: "Implied consent through usage",
        severity: Severity::Moderate,
        weight: 10,
        rules: &[
            broad(r"(?i)by.*?using.*?this.*?service.*?you.*?agree"),
            broad(r"(?i)continued.*?use.*?constitutes.*?acceptance"),
            broad(r"(?i)accessing.*?implies.*?consent"),
            broad(r"(?i)deemed.*?to.*?have.*?accepted"),
        ],
    },
    // -- Dark patterns ------------------------------------------------------
    CategorySpec {
        id: "urgency_pressure",
        namespace: Namespace::DarkPattern,
        title: "Urgency Pressure",
        description: "Time pressure pushing you to decide quickly",
        severity: Severity::Moderate,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)limited.*?time.*?offer"),
            broad(r"(?i)act.*?now.*?or"),
            broad(r"(?i)expires.*?soon"),
            broad(r"(?i)last.*?chance"),
            broad(r"(?i)must.*?act.*?immediately"),
            broad(r"(?i)offer.*?expires.*?midnight"),
        ],
    },
    CategorySpec {
        id: "hidden_costs",
        namespace: Namespace::DarkPattern,
        title: "Hidden Costs",
        description: "Fees and charges that are easy to miss",
        severity: Severity::Critical,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)additional.*?fees.*?may.*?apply"),
            broad(r"(?i)subject.*?to.*?additional.*?charges"),
            broad(r"(?i)plus.*?applicable.*?taxes"),
            broad(r"(?i)excluding.*?processing.*?fees"),
            broad(r"(?i)may.*?incur.*?additional.*?costs"),
            broad(r"(?i)supplemental.*?charges.*?may.*?apply"),
            specific(
                r"(?i)(?:additional|extra|other).*?(?:fees|charges|costs).*?(?:may|might|could).*?(?:apply|occur|be charged)",
                0.75,
            ),
            specific(
                r"(?i)(?:taxes|shipping|handling|processing).*?(?:fees|charges).*?(?:additional|extra|separate)",
                0.75,
            ),
            specific(
                r"(?i)(?:subject to|plus).*?(?:applicable|current|prevailing).*?(?:taxes|fees|charges|surcharges)",
                0.75,
            ),
            specific(
                r"(?i)(?:excluding|not including|separate).*?(?:delivery|shipping|processing|transaction).*?(?:fees|costs)",
                0.75,
            ),
        ],
    },
    CategorySpec {
        id: "confusing_language",
        namespace: Namespace::DarkPattern,
        title: "Confusing Language",
        description: "Legalese that obscures what you are agreeing to",
        severity: Severity::Moderate,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)notwithstanding.*?the.*?foregoing"),
            broad(r"(?i)subject.*?to.*?the.*?provisions.*?herein"),
            broad(r"(?i)without.*?prejudice.*?to"),
            broad(r"(?i)save.*?as.*?otherwise.*?provided"),
            broad(r"(?i)pursuant.*?to.*?the.*?aforementioned"),
            broad(r"(?i)heretofore.*?and.*?hereafter"),
        ],
    },
    CategorySpec {
        id: "opt_out_difficulty",
        namespace: Namespace::DarkPattern,
        title: "Opt-out Difficulty",
        description: "Leaving or unsubscribing is made deliberately hard",
        severity: Severity::Moderate,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)to.*?opt.*?out.*?you.*?must.*?contact"),
            broad(r"(?i)unsubscribe.*?by.*?writing.*?to"),
            broad(r"(?i)cancellation.*?requires.*?30.*?days"),
            broad(r"(?i)written.*?notice.*?required.*?for"),
            broad(r"(?i)must.*?provide.*?90.*?days.*?notice"),
            broad(r"(?i)cancellation.*?must.*?be.*?in.*?writing"),
            specific(
                r"(?i)(?:cancel|unsubscribe|opt.*?out).*?(?:must|required to|need to).*?(?:call|phone|contact|write|mail)",
                0.80,
            ),
            specific(
                r"(?i)(?:cancellation|termination).*?(?:requires|needs).*?(?:\d+.*?days|weeks|months).*?(?:notice|advance notice)",
                0.80,
            ),
            specific(
                r"(?i)(?:written|physical|postal).*?(?:notice|request|form).*?(?:required|necessary).*?(?:cancel|terminate)",
                0.80,
            ),
            specific(
                r"(?i)(?:online|website).*?(?:cancellation|termination).*?(?:not available|not permitted|not allowed)",
                0.80,
            ),
        ],
    },
    CategorySpec {
        id: "auto_renewal",
        namespace: Namespace::DarkPattern,
        title: "Auto-renewal",
        description: "Subscriptions that renew and bill without asking",
        severity: Severity::Critical,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)automatically.*?renew"),
            broad(r"(?i)auto.*?renewal"),
            broad(r"(?i)subscription.*?will.*?continue"),
            broad(r"(?i)recurring.*?billing"),
            broad(r"(?i)charged.*?automatically"),
            specific(
                r"(?i)(?:automatic|auto).*?(?:renewal|billing|charge|payment).*?(?:unless|until).*?(?:cancel|opt.*?out)",
                0.80,
            ),
            specific(
                r"(?i)(?:subscription|service).*?(?:continues|renews).*?(?:automatically|auto).*?(?:same|current).*?(?:rate|price)",
                0.80,
            ),
            specific(
                r"(?i)(?:cancel|stop).*?(?:before|prior to).*?(?:renewal|billing).*?(?:date|period).*?(?:avoid|prevent).*?(?:charge|fee)",
                0.80,
            ),
            specific(
                r"(?i)(?:trial|promotional).*?(?:period|offer).*?(?:ends|expires).*?(?:automatic|auto).*?(?:billing|charge)",
                0.80,
            ),
        ],
    },
    CategorySpec {
        id: "data_harvesting",
        namespace: Namespace::DarkPattern,
        title: "Data Harvesting",
        description: "Collection of behavioural and device data beyond what the service needs",
        severity: Severity::Moderate,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)collect.*?device.*?information"),
            broad(r"(?i)track.*?your.*?browsing"),
            broad(r"(?i)analytics.*?and.*?tracking"),
            broad(r"(?i)behavioral.*?data"),
            broad(r"(?i)usage.*?patterns.*?and.*?preferences"),
        ],
    },
    // -- Positive indicators ------------------------------------------------
    CategorySpec {
        id: "user_rights",
        namespace: Namespace::Positive,
        title: "User Rights",
        description: "Explicit rights to access, export, or delete your data",
        severity: Severity::Good,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)you.*?have.*?the.*?right.*?to"),
            broad(r"(?i)users.*?may.*?request.*?deletion"),
            broad(r"(?i)data.*?portability"),
            broad(r"(?i)right.*?to.*?access.*?your.*?data"),
            broad(r"(?i)opt.*?out.*?at.*?any.*?time"),
            specific(
                r"(?i)(?:you have|users have|user has).*?(?:right|rights).*?(?:access|obtain|request|delete|modify).*?(?:personal|your).*?(?:data|information)",
                0.80,
            ),
            specific(
                r"(?i)(?:data|information).*?(?:portability|export|download).*?(?:available|provided|offered)",
                0.80,
            ),
            specific(
                r"(?i)(?:opt.*?out|withdraw|revoke).*?(?:consent|permission).*?(?:any time|anytime|at will)",
                0.80,
            ),
            specific(
                r"(?i)(?:gdpr|ccpa|privacy).*?(?:rights|protections).*?(?:respected|honored|maintained)",
                0.80,
            ),
        ],
    },
    CategorySpec {
        id: "transparency",
        namespace: Namespace::Positive,
        title: "Transparency",
        description: "Clear notice and plain explanations of practices",
        severity: Severity::Good,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)we.*?will.*?notify.*?you"),
            broad(r"(?i)advance.*?notice"),
            broad(r"(?i)clear.*?and.*?conspicuous"),
            broad(r"(?i)plain.*?language"),
            broad(r"(?i)easy.*?to.*?understand"),
            specific(
                r"(?i)(?:clear|plain|simple|easy).*?(?:language|terms|explanation).*?(?:provided|used|written)",
                0.75,
            ),
            specific(
                r"(?i)(?:advance|prior).*?(?:notice|notification|warning).*?(?:changes|modifications|updates)",
                0.75,
            ),
            specific(
                r"(?i)(?:transparent|open|honest).*?(?:about|regarding).*?(?:data|information|practices)",
                0.75,
            ),
            specific(
                r"(?i)(?:explain|describe|detail).*?(?:how|why|when).*?(?:data|information).*?(?:used|processed|shared)",
                0.75,
            ),
        ],
    },
    CategorySpec {
        id: "data_protection",
        namespace: Namespace::Positive,
        title: "Data Protection",
        description: "Security measures that protect your information",
        severity: Severity::Good,
        weight: FLAT_WEIGHT,
        rules: &[
            broad(r"(?i)encrypt.*?your.*?data"),
            broad(r"(?i)secure.*?transmission"),
            broad(r"(?i)gdpr.*?compliant"),
            broad(r"(?i)data.*?protection.*?measures"),
            broad(r"(?i)privacy.*?by.*?design"),
            specific(
                r"(?i)(?:encrypt|secure|protect).*?(?:your|user|personal).*?(?:data|information).*?(?:transmission|storage|processing)",
                0.80,
            ),
            specific(
                r"(?i)(?:industry.*?standard|best.*?practices|state.*?of.*?art).*?(?:security|protection|encryption)",
                0.80,
            ),
            specific(
                r"(?i)(?:privacy.*?by.*?design|data.*?minimization|purpose.*?limitation).*?(?:principles|practices)",
                0.80,
            ),
            specific(
                r"(?i)(?:regular|periodic|ongoing).*?(?:security|privacy).*?(?:audits|assessments|reviews)",
                0.80,
            ),
        ],
    },
];

/// One compiled pattern.
#[derive(Debug, Clone)]
pub struct RuleDefinition {
    pub category_id: String,
    pub pattern: Regex,
    pub base_weight: u32,
    pub base_confidence: f32,
}

/// A compiled category with its rules in declaration order.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub namespace: Namespace,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub weight: u32,
    pub rules: Vec<RuleDefinition>,
}

/// Compiled, immutable rule tables. Shared read-only across analyses.
#[derive(Debug, Clone)]
pub struct RuleBook {
    categories: Vec<Category>,
}

impl RuleBook {
    /// Compile every pattern in `specs`. Any malformed pattern, repeated id, or
    /// empty category is rejected here so that analysis itself cannot fail on
    /// rule content.
    pub fn compile(specs: &[CategorySpec]) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.id) {
                return Err(RuleError::DuplicateCategory(spec.id.to_string()));
            }
            if spec.rules.is_empty() {
                return Err(RuleError::EmptyRuleSet(spec.id.to_string()));
            }

            let rules = spec
                .rules
                .iter()
                .enumerate()
                .map(|(index, rule)| {
                    let pattern =
                        Regex::new(rule.pattern).map_err(|source| RuleError::InvalidPattern {
                            category: spec.id.to_string(),
                            index,
                            source,
                        })?;
                    Ok(RuleDefinition {
                        category_id: spec.id.to_string(),
                        pattern,
                        base_weight: spec.weight,
                        base_confidence: rule.base_confidence,
                    })
                })
                .collect::<Result<Vec<_>, RuleError>>()?;

            categories.push(Category {
                id: spec.id.to_string(),
                namespace: spec.namespace,
                title: spec.title.to_string(),
                description: spec.description.to_string(),
                severity: spec.severity,
                weight: spec.weight,
                rules,
            });
        }

        debug!(
            categories = categories.len(),
            patterns = categories.iter().map(|c| c.rules.len()).sum::<usize>(),
            "rule book compiled"
        );
        Ok(Self { categories })
    }

    /// Replace the weights of risk categories. Only risk weights feed the
    /// score, so naming any other category is an error.
    pub fn with_risk_weights(mut self, weights: &BTreeMap<String, u32>) -> Result<Self, ConfigError> {
        for (id, &weight) in weights {
            let category = self
                .categories
                .iter_mut()
                .find(|c| c.id == *id && c.namespace == Namespace::Risk)
                .ok_or_else(|| ConfigError::UnknownCategory(id.clone()))?;
            category.weight = weight;
            for rule in &mut category.rules {
                rule.base_weight = weight;
            }
        }
        Ok(self)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn namespace(&self, namespace: Namespace) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |c| c.namespace == namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> RuleBook {
        RuleBook::compile(DEFAULT_CATEGORIES).unwrap()
    }

    #[test]
    fn default_table_compiles() {
        let book = book();
        assert_eq!(book.namespace(Namespace::Risk).count(), 6);
        assert_eq!(book.namespace(Namespace::DarkPattern).count(), 6);
        assert_eq!(book.namespace(Namespace::Positive).count(), 3);
    }

    #[test]
    fn risk_weights_match_table() {
        let book = book();
        let weights: Vec<(&str, u32)> = book
            .namespace(Namespace::Risk)
            .map(|c| (c.id.as_str(), c.weight))
            .collect();
        assert_eq!(
            weights,
            vec![
                ("data_sharing", 25),
                ("arbitration_waiver", 20),
                ("unilateral_changes", 15),
                ("account_termination", 15),
                ("liability_limitation", 12),
                ("consent_by_default", 10),
            ]
        );
    }

    #[test]
    fn base_confidences_are_in_range() {
        for category in book().categories() {
            for rule in &category.rules {
                assert!((0.0..=1.0).contains(&rule.base_confidence), "{}", category.id);
                assert_eq!(rule.base_weight, category.weight);
            }
        }
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        const BAD: &[CategorySpec] = &[CategorySpec {
            id: "broken",
            namespace: Namespace::Risk,
            title: "Broken",
            description: "",
            severity: Severity::Moderate,
            weight: 1,
            rules: &[broad("ok"), broad("(unclosed")],
        }];
        match RuleBook::compile(BAD) {
            Err(RuleError::InvalidPattern { category, index, .. }) => {
                assert_eq!(category, "broken");
                assert_eq!(index, 1);
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_and_empty_categories_are_rejected() {
        const DUP: &[CategorySpec] = &[
            CategorySpec {
                id: "a",
                namespace: Namespace::Risk,
                title: "A",
                description: "",
                severity: Severity::Moderate,
                weight: 1,
                rules: &[broad("a")],
            },
            CategorySpec {
                id: "a",
                namespace: Namespace::Positive,
                title: "A",
                description: "",
                severity: Severity::Good,
                weight: 1,
                rules: &[broad("a")],
            },
        ];
        assert!(matches!(
            RuleBook::compile(DUP),
            Err(RuleError::DuplicateCategory(id)) if id == "a"
        ));

        const EMPTY: &[CategorySpec] = &[CategorySpec {
            id: "e",
            namespace: Namespace::Risk,
            title: "E",
            description: "",
            severity: Severity::Moderate,
            weight: 1,
            rules: &[],
        }];
        assert!(matches!(
            RuleBook::compile(EMPTY),
            Err(RuleError::EmptyRuleSet(id)) if id == "e"
        ));
    }

    #[test]
    fn weight_overrides_apply_to_risk_only() {
        let weights = BTreeMap::from([("data_sharing".to_string(), 40)]);
        let book = book().with_risk_weights(&weights).unwrap();
        let category = book.category("data_sharing").unwrap();
        assert_eq!(category.weight, 40);
        assert!(category.rules.iter().all(|r| r.base_weight == 40));

        let bad = BTreeMap::from([("auto_renewal".to_string(), 3)]);
        assert!(matches!(
            self::book().with_risk_weights(&bad),
            Err(ConfigError::UnknownCategory(id)) if id == "auto_renewal"
        ));
    }
}
