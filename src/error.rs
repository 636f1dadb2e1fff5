//! Error kinds surfaced by model construction and solving

use crate::grid::Cell;
use crate::model::VariableRole;
use thiserror::Error;

/// Failures that end a solve attempt for one puzzle instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The accumulated constraint set admits no assignment
    #[error("puzzle instance has no solution: the constraint set is infeasible")]
    ModelInfeasible,

    /// Region center cells violate the 1/2/4 contiguous-cell precondition
    #[error("region {region} is malformed ({reason}): centers {centers:?}")]
    MalformedRegion {
        region: usize,
        centers: Vec<Cell>,
        reason: String,
    },

    /// The cut loop hit its configured iteration bound
    #[error("loop did not converge to a single cycle after {iterations} cut rounds")]
    LoopDidNotConverge { iterations: usize },

    /// The solver produced no active edges, so there is nothing to cut
    #[error("solver returned an assignment with no active edges")]
    EmptyLoop,

    #[error("variable {role:?} is outside the {rows}x{cols} grid")]
    VariableOutOfBounds {
        role: VariableRole,
        rows: usize,
        cols: usize,
    },

    #[error("{backend} backend failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("solver backend `{0}` is not available in this build")]
    BackendUnavailable(String),
}

impl SolveError {
    pub(crate) fn malformed(region: usize, centers: &[Cell], reason: impl Into<String>) -> Self {
        SolveError::MalformedRegion {
            region,
            centers: centers.to_vec(),
            reason: reason.into(),
        }
    }

    /// True when the puzzle itself has no solution (as opposed to a tooling failure)
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveError::ModelInfeasible)
    }
}
