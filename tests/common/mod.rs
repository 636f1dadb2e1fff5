//! Shared fixtures for integration tests

use grid_puzzle_ilp::error::SolveError;
use grid_puzzle_ilp::grid::Edge;
use grid_puzzle_ilp::model::{Assignment, Constraint, IlpBackend, SolveStatus, VariableManager, VariableRole};
use std::collections::HashSet;

/// Backend that replays a fixed sequence of edge sets, one per solve.
/// `None` answers infeasible; running past the end repeats the last entry.
pub struct ScriptedBackend {
    script: Vec<Option<Vec<Edge>>>,
    calls: usize,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Option<Vec<Edge>>>) -> Self {
        Self { script, calls: 0 }
    }
}

impl IlpBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn solve(&mut self, variables: &VariableManager, _: &[Constraint]) -> Result<SolveStatus, SolveError> {
        let index = self.calls.min(self.script.len().saturating_sub(1));
        self.calls += 1;
        let Some(active) = self.script.get(index).cloned().flatten() else {
            return Ok(SolveStatus::Infeasible);
        };

        let active: HashSet<Edge> = active.into_iter().collect();
        let values: Vec<bool> = variables
            .iter()
            .map(|(_, role)| match role {
                VariableRole::Edge(edge) => active.contains(edge),
                // corners on the loop; enough for the parity rows to read sensibly
                VariableRole::Point(corner) => active.iter().any(|e| e.corners().contains(corner)),
                _ => false,
            })
            .collect();
        Ok(SolveStatus::Optimal(Assignment::new(values)))
    }
}

/// Four edges around the cell at (row, col)
pub fn unit_square(row: usize, col: usize) -> Vec<Edge> {
    vec![
        Edge::horizontal(row, col),
        Edge::vertical(row, col + 1),
        Edge::horizontal(row + 1, col),
        Edge::vertical(row, col),
    ]
}

/// Perimeter of the 2x2 block whose top-left cell is (row, col)
pub fn block_perimeter(row: usize, col: usize) -> Vec<Edge> {
    vec![
        Edge::horizontal(row, col),
        Edge::horizontal(row, col + 1),
        Edge::vertical(row, col + 2),
        Edge::vertical(row + 1, col + 2),
        Edge::horizontal(row + 2, col + 1),
        Edge::horizontal(row + 2, col),
        Edge::vertical(row + 1, col),
        Edge::vertical(row, col),
    ]
}
