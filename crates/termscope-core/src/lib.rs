pub mod error;
pub mod finding;
pub mod report;
pub mod segment;

pub use error::{InputError, decode_text};
pub use finding::{CategoryFinding, ConfidenceBand, Match, MatchSource, Namespace, Severity};
pub use report::{
    AnalysisResult, ClassificationMethod, FlaggedSection, KeyConcern, ReadabilityMetrics, Summary,
    Verdict,
};
pub use segment::{Flattened, Segment, SegmentKind, normalize, segment};
