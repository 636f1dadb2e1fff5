//! Coordinate arithmetic for an R x C puzzle grid

use anyhow::Result;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell of the grid, addressed by row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two cells
    pub fn distance(&self, other: &Cell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn is_orthogonally_adjacent(&self, other: &Cell) -> bool {
        self.distance(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A lattice point where up to four edges meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Corner {
    pub row: usize,
    pub col: usize,
}

impl Corner {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A unit segment of the lattice.
///
/// Horizontal edge `(r, c)` joins corners `(r, c)` and `(r, c + 1)`;
/// vertical edge `(r, c)` joins corners `(r, c)` and `(r + 1, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub orientation: Orientation,
    pub row: usize,
    pub col: usize,
}

impl Edge {
    pub const fn horizontal(row: usize, col: usize) -> Self {
        Self { orientation: Orientation::Horizontal, row, col }
    }

    pub const fn vertical(row: usize, col: usize) -> Self {
        Self { orientation: Orientation::Vertical, row, col }
    }

    /// The two corner points this edge touches
    pub fn corners(&self) -> [Corner; 2] {
        match self.orientation {
            Orientation::Horizontal => [
                Corner::new(self.row, self.col),
                Corner::new(self.row, self.col + 1),
            ],
            Orientation::Vertical => [
                Corner::new(self.row, self.col),
                Corner::new(self.row + 1, self.col),
            ],
        }
    }

    /// Two distinct edges are adjacent when they share a corner point
    pub fn is_adjacent(&self, other: &Edge) -> bool {
        if self == other {
            return false;
        }
        let theirs = other.corners();
        self.corners().iter().any(|corner| theirs.contains(corner))
    }

    /// The corner shared with `other`, if any
    pub fn shared_corner(&self, other: &Edge) -> Option<Corner> {
        if self == other {
            return None;
        }
        let theirs = other.corners();
        self.corners().into_iter().find(|corner| theirs.contains(corner))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.orientation {
            Orientation::Horizontal => 'h',
            Orientation::Vertical => 'v',
        };
        write!(f, "{}({}, {})", tag, self.row, self.col)
    }
}

/// Shape of a rectangular grid and the derived cell, edge and corner sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTopology {
    pub rows: usize,
    pub cols: usize,
}

impl GridTopology {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            anyhow::bail!("Grid shape must be positive, got {}x{}", rows, cols);
        }
        Ok(Self { rows, cols })
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        match edge.orientation {
            Orientation::Horizontal => edge.row <= self.rows && edge.col < self.cols,
            Orientation::Vertical => edge.row < self.rows && edge.col <= self.cols,
        }
    }

    pub fn contains_corner(&self, corner: Corner) -> bool {
        corner.row <= self.rows && corner.col <= self.cols
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        iproduct!(0..self.rows, 0..self.cols).map(|(row, col)| Cell::new(row, col))
    }

    pub fn horizontal_edges(&self) -> impl Iterator<Item = Edge> {
        iproduct!(0..=self.rows, 0..self.cols).map(|(row, col)| Edge::horizontal(row, col))
    }

    pub fn vertical_edges(&self) -> impl Iterator<Item = Edge> {
        iproduct!(0..self.rows, 0..=self.cols).map(|(row, col)| Edge::vertical(row, col))
    }

    /// Horizontal edges followed by vertical edges
    pub fn edges(&self) -> impl Iterator<Item = Edge> {
        self.horizontal_edges().chain(self.vertical_edges())
    }

    pub fn edge_count(&self) -> usize {
        (self.rows + 1) * self.cols + self.rows * (self.cols + 1)
    }

    pub fn corners(&self) -> impl Iterator<Item = Corner> {
        iproduct!(0..=self.rows, 0..=self.cols).map(|(row, col)| Corner::new(row, col))
    }

    /// Edges incident to a corner point (two to four of them)
    pub fn corner_edges(&self, corner: Corner) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(4);
        if corner.row > 0 {
            edges.push(Edge::vertical(corner.row - 1, corner.col));
        }
        if corner.row < self.rows {
            edges.push(Edge::vertical(corner.row, corner.col));
        }
        if corner.col > 0 {
            edges.push(Edge::horizontal(corner.row, corner.col - 1));
        }
        if corner.col < self.cols {
            edges.push(Edge::horizontal(corner.row, corner.col));
        }
        edges
    }

    /// The four edges surrounding a cell: top, bottom, left, right
    pub fn cell_edges(&self, cell: Cell) -> [Edge; 4] {
        [
            Edge::horizontal(cell.row, cell.col),
            Edge::horizontal(cell.row + 1, cell.col),
            Edge::vertical(cell.row, cell.col),
            Edge::vertical(cell.row, cell.col + 1),
        ]
    }

    /// On-grid 4-neighbours of a cell: up, left, down, right
    pub fn orthogonal_neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut neighbors = Vec::with_capacity(4);
        if cell.row > 0 {
            neighbors.push(Cell::new(cell.row - 1, cell.col));
        }
        if cell.col > 0 {
            neighbors.push(Cell::new(cell.row, cell.col - 1));
        }
        if cell.row + 1 < self.rows {
            neighbors.push(Cell::new(cell.row + 1, cell.col));
        }
        if cell.col + 1 < self.cols {
            neighbors.push(Cell::new(cell.row, cell.col + 1));
        }
        neighbors
    }
}

impl fmt::Display for GridTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_counts() {
        let grid = GridTopology::new(3, 4).unwrap();
        assert_eq!(grid.cells().count(), 12);
        assert_eq!(grid.horizontal_edges().count(), 4 * 4);
        assert_eq!(grid.vertical_edges().count(), 3 * 5);
        assert_eq!(grid.edges().count(), grid.edge_count());
        assert_eq!(grid.corners().count(), 4 * 5);
    }

    #[test]
    fn test_zero_shape_rejected() {
        assert!(GridTopology::new(0, 3).is_err());
        assert!(GridTopology::new(3, 0).is_err());
    }

    #[test]
    fn test_every_edge_touches_two_corners_on_grid() {
        let grid = GridTopology::new(2, 3).unwrap();
        for edge in grid.edges() {
            let [a, b] = edge.corners();
            assert_ne!(a, b);
            assert!(grid.contains_corner(a));
            assert!(grid.contains_corner(b));
            assert!(grid.corner_edges(a).contains(&edge));
            assert!(grid.corner_edges(b).contains(&edge));
        }
    }

    #[test]
    fn test_edge_adjacency_rules() {
        // same row, columns differ by one
        assert!(Edge::horizontal(1, 1).is_adjacent(&Edge::horizontal(1, 2)));
        assert!(!Edge::horizontal(1, 1).is_adjacent(&Edge::horizontal(1, 3)));
        assert!(!Edge::horizontal(1, 1).is_adjacent(&Edge::horizontal(2, 1)));
        // same column, rows differ by one
        assert!(Edge::vertical(0, 2).is_adjacent(&Edge::vertical(1, 2)));
        assert!(!Edge::vertical(0, 2).is_adjacent(&Edge::vertical(0, 3)));
        // mixed: vertical row within one of the horizontal row, column c or c + 1
        let h = Edge::horizontal(2, 3);
        for v in [
            Edge::vertical(1, 3),
            Edge::vertical(2, 3),
            Edge::vertical(1, 4),
            Edge::vertical(2, 4),
        ] {
            assert!(h.is_adjacent(&v), "{} should touch {}", h, v);
            assert!(v.is_adjacent(&h));
        }
        assert!(!h.is_adjacent(&Edge::vertical(0, 3)));
        assert!(!h.is_adjacent(&Edge::vertical(2, 5)));
        assert!(!h.is_adjacent(&h));
    }

    #[test]
    fn test_corner_edges_on_boundary() {
        let grid = GridTopology::new(2, 2).unwrap();
        assert_eq!(grid.corner_edges(Corner::new(0, 0)).len(), 2);
        assert_eq!(grid.corner_edges(Corner::new(0, 1)).len(), 3);
        assert_eq!(grid.corner_edges(Corner::new(1, 1)).len(), 4);
    }

    #[test]
    fn test_orthogonal_neighbors() {
        let grid = GridTopology::new(3, 3).unwrap();
        assert_eq!(grid.orthogonal_neighbors(Cell::new(1, 1)).len(), 4);
        assert_eq!(grid.orthogonal_neighbors(Cell::new(0, 0)).len(), 2);
        assert!(grid.orthogonal_neighbors(Cell::new(2, 2)).contains(&Cell::new(1, 2)));
    }
}
