pub mod aggregate;
pub mod conflict;
pub mod engine;
pub mod merge;
pub mod quality;

pub use aggregate::{aggregate_claims, aggregate_facts};
pub use conflict::{snippet_conflicts, stances, Stance};
pub use engine::{ConfidencePolicy, ScoreModel};
pub use merge::{canonical_key, merge, SNIPPET_MAX_WORDS};
pub use quality::{classify, classify_tier, QualityAssessment, SourceTier};
