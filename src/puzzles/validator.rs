//! Independent re-check of solutions against their puzzle definitions

use super::definition::{GalaxiesDefinition, PuzzleDefinition, SlitherlinkDefinition};
use super::solution::{LoopSolution, PuzzleSolution, RegionSolution};
use crate::cycles::decompose_cycles;
use crate::grid::{Cell, GridTopology};
use anyhow::Result;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use std::collections::BTreeSet;
use std::fmt;

/// Checks solutions without the solver
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionValidator;

/// Result of solution validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub checks_performed: usize,
    pub violations: Vec<String>,
}

impl ValidationResult {
    fn record(&mut self, ok: bool, violation: impl FnOnce() -> String) {
        self.checks_performed += 1;
        if !ok {
            self.violations.push(violation());
        }
    }

    fn finish(mut self) -> Self {
        self.is_valid = self.violations.is_empty();
        self
    }

    /// First violation, if any
    pub fn error_message(&self) -> Option<&str> {
        self.violations.first().map(String::as_str)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid {
            write!(f, "valid ({} checks)", self.checks_performed)
        } else {
            writeln!(f, "invalid ({} of {} checks failed):", self.violations.len(), self.checks_performed)?;
            for violation in &self.violations {
                writeln!(f, "  - {}", violation)?;
            }
            Ok(())
        }
    }
}

impl SolutionValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, definition: &PuzzleDefinition, solution: &PuzzleSolution) -> Result<ValidationResult> {
        match (definition, solution) {
            (PuzzleDefinition::Slitherlink(def), PuzzleSolution::Loop(sol)) => self.validate_loop(def, sol),
            (PuzzleDefinition::Galaxies(def), PuzzleSolution::Regions(sol)) => self.validate_regions(def, sol),
            (def, sol) => {
                let mut result = ValidationResult::default();
                result.record(false, || {
                    format!("{} puzzle cannot have a {} solution", def.name(), sol.kind())
                });
                Ok(result.finish())
            }
        }
    }

    /// Clues hold and the active edges form exactly one simple cycle
    pub fn validate_loop(&self, definition: &SlitherlinkDefinition, solution: &LoopSolution) -> Result<ValidationResult> {
        let topology = definition.topology()?;
        let mut result = ValidationResult::default();

        result.record(solution.shape == definition.shape, || {
            format!("solution shape {:?} does not match puzzle shape {:?}", solution.shape, definition.shape)
        });
        if !result.violations.is_empty() {
            return Ok(result.finish());
        }

        for clue in &definition.clues {
            let count = topology
                .cell_edges(clue.cell())
                .iter()
                .filter(|&&edge| solution.is_active(edge))
                .count();
            result.record(count == usize::from(clue.val), || {
                format!("cell {} has {} loop edges, clue says {}", clue.cell(), count, clue.val)
            });
        }

        let active = solution.active_edges();
        let cycles = decompose_cycles(&active);
        result.record(cycles.len() == 1, || {
            format!("active edges form {} components, expected one loop", cycles.len())
        });
        if let [cycle] = cycles.as_slice() {
            result.record(cycle.is_simple_cycle(), || "loop branches or is not closed".to_string());
        }

        Ok(result.finish())
    }

    /// Every cell owned once, centers owned by their galaxy, every galaxy
    /// point-symmetric about its centroid and 4-connected
    pub fn validate_regions(&self, definition: &GalaxiesDefinition, solution: &RegionSolution) -> Result<ValidationResult> {
        let topology = definition.topology()?;
        let regions = definition.regions()?;
        let mut result = ValidationResult::default();

        let shape_ok = solution.shape == definition.shape
            && solution.owners.len() == topology.rows
            && solution.owners.iter().all(|row| row.len() == topology.cols);
        result.record(shape_ok, || {
            format!("solution shape {:?} does not match puzzle shape {:?}", solution.shape, definition.shape)
        });
        if !shape_ok {
            return Ok(result.finish());
        }

        for cell in topology.cells() {
            let owner = solution.owner(cell);
            result.record(owner.is_some_and(|o| o < regions.len()), || {
                format!("cell {} is owned by unknown galaxy {:?}", cell, owner)
            });
        }

        for region in &regions {
            let cells = solution.region_cells(region.index());

            for &center in region.centers() {
                result.record(cells.contains(&center), || {
                    format!("center {} is not in galaxy {}", center, region.index())
                });
            }

            let asymmetric: Vec<Cell> = cells
                .iter()
                .copied()
                .filter(|&cell| !region.reflect(cell, &topology).is_some_and(|m| cells.contains(&m)))
                .collect();
            result.record(asymmetric.is_empty(), || {
                format!("galaxy {} is not symmetric at {:?}", region.index(), asymmetric)
            });

            let reached = reachable_count(&topology, &cells, region.centers().first().copied());
            result.record(reached == cells.len(), || {
                format!("galaxy {} is split: {} of {} cells connected", region.index(), reached, cells.len())
            });
        }

        Ok(result.finish())
    }
}

/// Cells of `cells` reachable from `start` through orthogonal steps inside the set
fn reachable_count(topology: &GridTopology, cells: &BTreeSet<Cell>, start: Option<Cell>) -> usize {
    let Some(start) = start.filter(|s| cells.contains(s)) else {
        return 0;
    };

    let mut graph: UnGraphMap<Cell, ()> = UnGraphMap::new();
    for &cell in cells {
        graph.add_node(cell);
        for neighbour in topology.orthogonal_neighbors(cell) {
            if cells.contains(&neighbour) {
                graph.add_edge(cell, neighbour, ());
            }
        }
    }

    let mut bfs = Bfs::new(&graph, start);
    let mut count = 0;
    while bfs.next(&graph).is_some() {
        count += 1;
    }
    count
}
