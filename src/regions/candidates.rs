//! Symmetry-based pruning of the cells a region may extend into

use super::Region;
use crate::grid::{Cell, GridTopology};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Cells a region may contain besides its own centers.
///
/// Always closed under point reflection about the region's centroid and
/// disjoint from every region's center cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateCells {
    cells: BTreeSet<Cell>,
}

impl CandidateCells {
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Candidates at or above the region's topmost center row
    pub fn forward_half<'a>(&'a self, region: &'a Region) -> impl Iterator<Item = Cell> + 'a {
        self.iter().filter(move |&cell| region.is_forward(cell))
    }
}

/// Candidate set of `region`, given every region of the puzzle
pub fn prune_candidates(topology: &GridTopology, region: &Region, regions: &[Region]) -> CandidateCells {
    let all_centers: HashSet<Cell> = regions
        .iter()
        .flat_map(|r| r.centers().iter().copied())
        .collect();

    let centroid = region.centroid();
    // every cell in this window has its mirror on the grid
    let first_row = centroid.row2.saturating_sub(topology.rows - 1);
    let last_row = region.forward_row();
    let first_col = centroid.col2.saturating_sub(topology.cols - 1);
    let last_col = centroid.col2.min(topology.cols - 1);

    let mut cells = BTreeSet::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let cell = Cell::new(row, col);
            if all_centers.contains(&cell) {
                continue;
            }
            let Some(mirror) = region.reflect(cell, topology) else {
                continue;
            };
            if all_centers.contains(&mirror) {
                continue;
            }
            cells.insert(cell);
            cells.insert(mirror);
        }
    }

    debug!(region = region.index(), candidates = cells.len(), "pruned candidate cells");
    CandidateCells { cells }
}

/// Candidate sets for every region, indexed like `regions`
pub fn prune_all(topology: &GridTopology, regions: &[Region]) -> Vec<CandidateCells> {
    regions
        .iter()
        .map(|region| prune_candidates(topology, region, regions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    fn region(index: usize, coords: &[(usize, usize)], topology: &GridTopology) -> Region {
        let centers: Vec<Cell> = coords.iter().map(|&(r, c)| Cell::new(r, c)).collect();
        Region::new(index, &centers, topology).unwrap()
    }

    fn assert_invariants(topology: &GridTopology, regions: &[Region]) {
        let all_centers: HashSet<Cell> = regions.iter().flat_map(|r| r.centers().to_vec()).collect();
        for (region, candidates) in regions.iter().zip(prune_all(topology, regions)) {
            for cell in candidates.iter() {
                assert!(topology.contains(cell));
                assert!(!all_centers.contains(&cell), "{} is a center", cell);
                let mirror = region.reflect(cell, topology);
                assert!(
                    mirror.is_some_and(|m| candidates.contains(m)),
                    "{} has no mirror in {}",
                    cell,
                    region
                );
            }
        }
    }

    #[test]
    fn test_lone_center_in_middle() {
        let topology = GridTopology::new(3, 3).unwrap();
        let regions = vec![region(0, &[(1, 1)], &topology)];
        let candidates = prune_candidates(&topology, &regions[0], &regions);
        assert_eq!(candidates.len(), 8);
        assert!(!candidates.contains(Cell::new(1, 1)));
        assert_eq!(candidates.forward_half(&regions[0]).count(), 5);
    }

    #[test]
    fn test_other_centers_excluded_with_mirrors() {
        let topology = GridTopology::new(3, 3).unwrap();
        let regions = vec![
            region(0, &[(0, 0)], &topology),
            region(1, &[(1, 1)], &topology),
            region(2, &[(2, 2)], &topology),
        ];
        let all = prune_all(&topology, &regions);

        assert!(all[0].is_empty());
        assert!(all[2].is_empty());
        let expected: BTreeSet<Cell> = [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]
            .iter()
            .map(|&(r, c)| Cell::new(r, c))
            .collect();
        assert_eq!(all[1].iter().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn test_corner_region_window() {
        let topology = GridTopology::new(4, 4).unwrap();
        let regions = vec![region(0, &[(0, 1), (0, 2)], &topology)];
        let candidates = prune_candidates(&topology, &regions[0], &regions);
        let cells: Vec<Cell> = candidates.iter().collect();
        assert_eq!(cells, vec![Cell::new(0, 0), Cell::new(0, 3)]);
    }

    #[test]
    fn test_pairing_over_all_two_region_layouts() {
        let topology = GridTopology::new(4, 5).unwrap();
        let cells: Vec<Cell> = topology.cells().collect();

        for (a, b) in iproduct!(cells.iter(), cells.iter()) {
            if a == b {
                continue;
            }
            let regions = vec![
                Region::new(0, &[*a], &topology).unwrap(),
                Region::new(1, &[*b], &topology).unwrap(),
            ];
            assert_invariants(&topology, &regions);
        }

        // two-cell and four-cell centers
        for (r, c) in iproduct!(0..3, 0..4) {
            let regions = vec![
                region(0, &[(r, c), (r, c + 1)], &topology),
                region(1, &[(3, 4)], &topology),
            ];
            assert_invariants(&topology, &regions);

            let block = vec![region(0, &[(r, c), (r, c + 1), (r + 1, c), (r + 1, c + 1)], &topology)];
            assert_invariants(&topology, &block);
        }
    }
}
