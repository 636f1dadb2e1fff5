//! Grid Puzzle ILP Solver
//!
//! Models grid logic puzzles as 0/1 integer programs. Loop puzzles are solved
//! with lazily added subtour cuts; region puzzles get symmetric candidate
//! pruning and path-based connectivity constraints.

pub mod config;
pub mod cycles;
pub mod error;
pub mod grid;
pub mod model;
pub mod puzzles;
pub mod regions;
pub mod utils;

pub use config::Settings;
pub use error::SolveError;
pub use puzzles::{PuzzleDefinition, PuzzleProblem, PuzzleSolution};

use anyhow::Result;

/// Main entry point: load the configured puzzle and solve it
pub fn solve_puzzle(settings: Settings) -> Result<PuzzleSolution> {
    let problem = PuzzleProblem::new(settings)?;
    problem.solve()
}
