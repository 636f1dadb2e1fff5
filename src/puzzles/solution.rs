//! Solved puzzle instances

use crate::cycles::LoopOutcome;
use crate::grid::{Cell, Edge, GridTopology, Orientation};
use crate::model::{Assignment, ModelBuilder, VariableRole};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Final assignment of a solved instance, keyed by grid coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PuzzleSolution {
    Loop(LoopSolution),
    Regions(RegionSolution),
}

/// Model size and solver effort behind a solution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveSummary {
    pub backend: String,
    pub variables: usize,
    pub constraints: usize,
    pub solver_calls: usize,
}

impl SolveSummary {
    pub fn from_builder(builder: &ModelBuilder) -> Self {
        let stats = builder.statistics();
        Self {
            backend: stats.backend.to_string(),
            variables: stats.variables.total_variables,
            constraints: stats.constraint_count,
            solver_calls: stats.solve_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopSolution {
    pub shape: (usize, usize),
    /// `horizontal[r][c]` is the edge above cell (r, c); `rows + 1` rows
    pub horizontal: Vec<Vec<bool>>,
    /// `vertical[r][c]` is the edge left of cell (r, c); `cols + 1` columns
    pub vertical: Vec<Vec<bool>>,
    pub cut_rounds: usize,
    pub cuts_added: usize,
    pub summary: SolveSummary,
    #[serde(skip)]
    pub solve_time: Duration,
}

impl LoopSolution {
    pub fn from_outcome(builder: &ModelBuilder, outcome: &LoopOutcome, solve_time: Duration) -> Self {
        let topology = *builder.topology();
        let mut solution = Self::empty(topology);
        for edge in outcome.cycle.edges() {
            solution.set(*edge, true);
        }
        solution.cut_rounds = outcome.cut_rounds;
        solution.cuts_added = outcome.cuts_added;
        solution.summary = SolveSummary::from_builder(builder);
        solution.solve_time = solve_time;
        solution
    }

    /// Solution with no active edges
    pub fn empty(topology: GridTopology) -> Self {
        Self {
            shape: (topology.rows, topology.cols),
            horizontal: vec![vec![false; topology.cols]; topology.rows + 1],
            vertical: vec![vec![false; topology.cols + 1]; topology.rows],
            cut_rounds: 0,
            cuts_added: 0,
            summary: SolveSummary::default(),
            solve_time: Duration::ZERO,
        }
    }

    /// Build from a list of active edges; edges off the grid are ignored
    pub fn from_edges<I: IntoIterator<Item = Edge>>(topology: GridTopology, edges: I) -> Self {
        let mut solution = Self::empty(topology);
        for edge in edges {
            solution.set(edge, true);
        }
        solution
    }

    pub fn set(&mut self, edge: Edge, active: bool) {
        let slot = match edge.orientation {
            Orientation::Horizontal => self.horizontal.get_mut(edge.row).and_then(|r| r.get_mut(edge.col)),
            Orientation::Vertical => self.vertical.get_mut(edge.row).and_then(|r| r.get_mut(edge.col)),
        };
        if let Some(slot) = slot {
            *slot = active;
        }
    }

    pub fn is_active(&self, edge: Edge) -> bool {
        let row = match edge.orientation {
            Orientation::Horizontal => self.horizontal.get(edge.row),
            Orientation::Vertical => self.vertical.get(edge.row),
        };
        row.and_then(|r| r.get(edge.col)).copied().unwrap_or(false)
    }

    pub fn topology(&self) -> Result<GridTopology> {
        GridTopology::new(self.shape.0, self.shape.1)
    }

    /// Active edges, horizontal first
    pub fn active_edges(&self) -> Vec<Edge> {
        let horizontal = self.horizontal.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .filter(|(_, &on)| on)
                .map(move |(col, _)| Edge::horizontal(row, col))
        });
        let vertical = self.vertical.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .filter(|(_, &on)| on)
                .map(move |(col, _)| Edge::vertical(row, col))
        });
        horizontal.chain(vertical).collect()
    }

    pub fn loop_length(&self) -> usize {
        self.active_edges().len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSolution {
    pub shape: (usize, usize),
    /// Owning region of every cell, row-major
    pub owners: Vec<Vec<usize>>,
    pub summary: SolveSummary,
    #[serde(skip)]
    pub solve_time: Duration,
}

impl RegionSolution {
    /// Read cell ownership out of a solved membership model
    pub fn from_assignment(
        builder: &ModelBuilder,
        assignment: &Assignment,
        solve_time: Duration,
    ) -> Result<Self> {
        let topology = *builder.topology();
        let mut owners = vec![vec![None; topology.cols]; topology.rows];

        for (id, role) in builder.variables().iter() {
            if let VariableRole::Membership { cell, region } = role {
                if assignment.value(id) {
                    let slot = &mut owners[cell.row][cell.col];
                    if let Some(previous) = slot.replace(*region) {
                        anyhow::bail!("Cell {} assigned to both galaxy {} and galaxy {}", cell, previous, region);
                    }
                }
            }
        }

        let owners = owners
            .into_iter()
            .enumerate()
            .map(|(row, cols)| {
                cols.into_iter()
                    .enumerate()
                    .map(|(col, owner)| owner.with_context(|| format!("Cell {} has no galaxy", Cell::new(row, col))))
                    .collect::<Result<Vec<usize>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            shape: (topology.rows, topology.cols),
            owners,
            summary: SolveSummary::from_builder(builder),
            solve_time,
        })
    }

    pub fn from_owners(owners: Vec<Vec<usize>>) -> Self {
        let rows = owners.len();
        let cols = owners.first().map_or(0, Vec::len);
        Self {
            shape: (rows, cols),
            owners,
            summary: SolveSummary::default(),
            solve_time: Duration::ZERO,
        }
    }

    pub fn owner(&self, cell: Cell) -> Option<usize> {
        self.owners.get(cell.row).and_then(|r| r.get(cell.col)).copied()
    }

    pub fn region_cells(&self, region: usize) -> BTreeSet<Cell> {
        self.owners
            .iter()
            .enumerate()
            .flat_map(|(row, cols)| {
                cols.iter()
                    .enumerate()
                    .filter(move |(_, &owner)| owner == region)
                    .map(move |(col, _)| Cell::new(row, col))
            })
            .collect()
    }

    pub fn region_count(&self) -> usize {
        self.owners.iter().flatten().max().map_or(0, |max| max + 1)
    }
}

impl PuzzleSolution {
    pub fn kind(&self) -> &'static str {
        match self {
            PuzzleSolution::Loop(_) => "loop",
            PuzzleSolution::Regions(_) => "regions",
        }
    }

    pub fn summary(&self) -> &SolveSummary {
        match self {
            PuzzleSolution::Loop(s) => &s.summary,
            PuzzleSolution::Regions(s) => &s.summary,
        }
    }

    pub fn solve_time(&self) -> Duration {
        match self {
            PuzzleSolution::Loop(s) => s.solve_time,
            PuzzleSolution::Regions(s) => s.solve_time,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json().context("Failed to serialize solution")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write solution: {}", path.display()))?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read solution: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Failed to parse solution: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn unit_loop() -> LoopSolution {
        let topology = GridTopology::new(2, 2).unwrap();
        LoopSolution::from_edges(
            topology,
            [
                Edge::horizontal(0, 0),
                Edge::horizontal(1, 0),
                Edge::vertical(0, 0),
                Edge::vertical(0, 1),
            ],
        )
    }

    #[test]
    fn test_loop_matrices() {
        let solution = unit_loop();
        assert_eq!(solution.horizontal.len(), 3);
        assert_eq!(solution.vertical[0].len(), 3);
        assert!(solution.is_active(Edge::vertical(0, 1)));
        assert!(!solution.is_active(Edge::vertical(1, 1)));
        assert!(!solution.is_active(Edge::horizontal(9, 9)));
        assert_eq!(solution.loop_length(), 4);
    }

    #[test]
    fn test_region_cells() {
        let solution = RegionSolution::from_owners(vec![vec![0, 0, 1], vec![2, 1, 1]]);
        assert_eq!(solution.shape, (2, 3));
        assert_eq!(solution.region_count(), 3);
        assert_eq!(solution.owner(Cell::new(1, 0)), Some(2));
        let region: Vec<Cell> = solution.region_cells(1).into_iter().collect();
        assert_eq!(region, vec![Cell::new(0, 2), Cell::new(1, 1), Cell::new(1, 2)]);
    }

    #[test]
    fn test_json_file_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("solution.json");

        let mut solution = unit_loop();
        solution.cut_rounds = 2;
        solution.solve_time = Duration::from_millis(5);
        let wrapped = PuzzleSolution::Loop(solution);
        wrapped.save_to_file(&path).unwrap();

        let loaded = PuzzleSolution::load_from_file(&path).unwrap();
        assert_eq!(loaded.kind(), "loop");
        // solve time is not persisted
        assert_eq!(loaded.solve_time(), Duration::ZERO);
        match loaded {
            PuzzleSolution::Loop(inner) => {
                assert_eq!(inner.cut_rounds, 2);
                assert_eq!(inner.loop_length(), 4);
            }
            other => panic!("unexpected {:?}", other),
        }

        let json = wrapped.to_json().unwrap();
        assert!(json.contains("\"kind\": \"loop\""));
    }
}
