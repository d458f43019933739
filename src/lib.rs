//! Rhythmic interval sequences: beat scoring, metric classification of their
//! rearrangements, complex-match search and conflict-free match assignment.

pub mod assignment;
pub mod batch;
pub mod classifier;
pub mod error;
pub mod matcher;
pub mod permutation;
pub mod scorer;
pub mod sequence;
pub mod variant;

pub use assignment::{Assignment, AssignmentBatch, MatchedTarget};
pub use batch::model::AnalysisConfig;
pub use classifier::{MetricConfig, is_excluded};
pub use error::{Result, SequenceError};
pub use matcher::{ComplexMatch, MatchConfig};
pub use permutation::{SearchBudget, bounded_odometer, distinct_permutations};
pub use scorer::BeatMetrics;
pub use sequence::{DefinitionKind, Sequence, intervals_of, onsets_of};
pub use variant::perturb;
