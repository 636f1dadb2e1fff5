//! Regions defined by their center cells

use crate::error::SolveError;
use crate::grid::{Cell, GridTopology};
use std::collections::BTreeSet;
use std::fmt;

/// Centroid of a region in doubled coordinates, so half-cell centers stay integral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Centroid {
    pub row2: usize,
    pub col2: usize,
}

impl Centroid {
    /// Point reflection of `cell`, or `None` when it falls off the top or left edge
    pub fn reflect(&self, cell: Cell) -> Option<Cell> {
        Some(Cell::new(
            self.row2.checked_sub(cell.row)?,
            self.col2.checked_sub(cell.col)?,
        ))
    }

    pub fn row(&self) -> f64 {
        self.row2 as f64 / 2.0
    }

    pub fn col(&self) -> f64 {
        self.col2 as f64 / 2.0
    }
}

impl fmt::Display for Centroid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

/// A galaxy: 1, 2 or 4 center cells inside one unit square, plus its centroid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    index: usize,
    centers: Vec<Cell>,
    centroid: Centroid,
}

impl Region {
    /// Validate `centers` and build the region
    pub fn new(index: usize, centers: &[Cell], topology: &GridTopology) -> Result<Self, SolveError> {
        if !matches!(centers.len(), 1 | 2 | 4) {
            return Err(SolveError::malformed(
                index,
                centers,
                format!("expected 1, 2 or 4 center cells, found {}", centers.len()),
            ));
        }

        if let Some(cell) = centers.iter().find(|&&cell| !topology.contains(cell)) {
            return Err(SolveError::malformed(
                index,
                centers,
                format!("center {} is outside the {} grid", cell, topology),
            ));
        }

        let unique: BTreeSet<Cell> = centers.iter().copied().collect();
        if unique.len() != centers.len() {
            return Err(SolveError::malformed(index, centers, "duplicate center cell"));
        }

        let sorted: Vec<Cell> = unique.into_iter().collect();
        let (min_row, max_row) = span(sorted.iter().map(|c| c.row));
        let (min_col, max_col) = span(sorted.iter().map(|c| c.col));

        if max_row - min_row > 1 || max_col - min_col > 1 {
            return Err(SolveError::malformed(index, centers, "center cells do not fit in one unit square"));
        }
        if sorted.len() == 2 && !sorted[0].is_orthogonally_adjacent(&sorted[1]) {
            return Err(SolveError::malformed(index, centers, "two center cells must share a side"));
        }

        Ok(Self {
            index,
            centers: sorted,
            centroid: Centroid {
                row2: min_row + max_row,
                col2: min_col + max_col,
            },
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Center cells in row-major order
    pub fn centers(&self) -> &[Cell] {
        &self.centers
    }

    pub fn centroid(&self) -> Centroid {
        self.centroid
    }

    pub fn is_center(&self, cell: Cell) -> bool {
        self.centers.contains(&cell)
    }

    /// Row of the topmost center cell; cells at or above it form the forward half
    pub fn forward_row(&self) -> usize {
        self.centers.first().map_or(0, |c| c.row)
    }

    pub fn is_forward(&self, cell: Cell) -> bool {
        cell.row <= self.forward_row()
    }

    /// Mirror image of `cell` through the centroid, if it lies on the grid
    pub fn reflect(&self, cell: Cell, topology: &GridTopology) -> Option<Cell> {
        self.centroid.reflect(cell).filter(|&mirror| topology.contains(mirror))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.centers.iter().map(|c| c.to_string()).collect();
        write!(f, "galaxy {} [{}] centroid {}", self.index, cells.join(" "), self.centroid)
    }
}

fn span(values: impl Iterator<Item = usize>) -> (usize, usize) {
    values.fold((usize::MAX, 0), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
