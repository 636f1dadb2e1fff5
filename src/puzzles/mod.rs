//! Puzzle families, their rules, and the solve pipeline

pub mod definition;
pub mod contributor;
pub mod slitherlink;
pub mod galaxies;
pub mod problem;
pub mod solution;
pub mod validator;

pub use definition::{Clue, GalaxiesDefinition, PuzzleDefinition, SlitherlinkDefinition};
pub use contributor::{apply_all, ConstraintContributor};
pub use galaxies::RegionLayout;
pub use problem::{ProblemAnalysis, PuzzleProblem, RegionAnalysis};
pub use solution::{LoopSolution, PuzzleSolution, RegionSolution, SolveSummary};
pub use validator::{SolutionValidator, ValidationResult};
