//! Puzzle definitions consumed by the solver

use crate::grid::{Cell, GridTopology};
use crate::regions::Region;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A validated-on-demand puzzle instance, tagged by family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "puzzle", rename_all = "snake_case")]
pub enum PuzzleDefinition {
    Slitherlink(SlitherlinkDefinition),
    Galaxies(GalaxiesDefinition),
}

/// Loop-drawing puzzle: clue numbers count the loop edges around a cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlitherlinkDefinition {
    pub shape: (usize, usize),
    #[serde(default, alias = "surrounded_line_number")]
    pub clues: Vec<Clue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub row: usize,
    pub col: usize,
    pub val: u8,
}

impl Clue {
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }
}

/// Region-partitioning puzzle: each galaxy is listed by its 1, 2 or 4 center cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalaxiesDefinition {
    pub shape: (usize, usize),
    pub galaxies: Vec<Vec<Cell>>,
}

impl PuzzleDefinition {
    pub fn name(&self) -> &'static str {
        match self {
            PuzzleDefinition::Slitherlink(_) => "slitherlink",
            PuzzleDefinition::Galaxies(_) => "galaxies",
        }
    }

    pub fn topology(&self) -> Result<GridTopology> {
        let (rows, cols) = match self {
            PuzzleDefinition::Slitherlink(def) => def.shape,
            PuzzleDefinition::Galaxies(def) => def.shape,
        };
        GridTopology::new(rows, cols)
    }

    /// Check the definition before any model is built
    pub fn validate(&self) -> Result<()> {
        match self {
            PuzzleDefinition::Slitherlink(def) => def.validate(),
            PuzzleDefinition::Galaxies(def) => def.regions().map(|_| ()),
        }
    }
}

impl SlitherlinkDefinition {
    pub fn topology(&self) -> Result<GridTopology> {
        GridTopology::new(self.shape.0, self.shape.1)
    }

    pub fn validate(&self) -> Result<()> {
        let topology = self.topology()?;
        let mut seen = HashMap::new();
        for clue in &self.clues {
            if !topology.contains(clue.cell()) {
                anyhow::bail!("Clue at {} is outside the {} grid", clue.cell(), topology);
            }
            if clue.val >= 4 {
                anyhow::bail!("Clue at {} has value {}, must be less than 4", clue.cell(), clue.val);
            }
            if let Some(previous) = seen.insert(clue.cell(), clue.val) {
                if previous != clue.val {
                    anyhow::bail!("Cell {} has conflicting clues {} and {}", clue.cell(), previous, clue.val);
                }
            }
        }
        Ok(())
    }

    pub fn clue_at(&self, cell: Cell) -> Option<u8> {
        self.clues.iter().find(|clue| clue.cell() == cell).map(|clue| clue.val)
    }
}

impl GalaxiesDefinition {
    pub fn topology(&self) -> Result<GridTopology> {
        GridTopology::new(self.shape.0, self.shape.1)
    }

    /// Build and validate every region; fails on the first malformed one
    pub fn regions(&self) -> Result<Vec<Region>> {
        let topology = self.topology()?;
        if self.galaxies.is_empty() {
            anyhow::bail!("Puzzle must have at least one galaxy");
        }

        let mut owners: HashMap<Cell, usize> = HashMap::new();
        let mut regions = Vec::with_capacity(self.galaxies.len());
        for (index, centers) in self.galaxies.iter().enumerate() {
            let region = Region::new(index, centers, &topology)
                .with_context(|| format!("Galaxy {} failed validation", index))?;
            for &cell in region.centers() {
                if let Some(other) = owners.insert(cell, index) {
                    anyhow::bail!("Cell {} is a center of both galaxy {} and galaxy {}", cell, other, index);
                }
            }
            regions.push(region);
        }
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolveError;

    #[test]
    fn test_parse_tagged_slitherlink() {
        let json = r#"{"puzzle": "slitherlink", "shape": [2, 3],
            "surrounded_line_number": [{"row": 0, "col": 1, "val": 2}]}"#;
        let def: PuzzleDefinition = serde_json::from_str(json).unwrap();
        match &def {
            PuzzleDefinition::Slitherlink(inner) => {
                assert_eq!(inner.shape, (2, 3));
                assert_eq!(inner.clue_at(Cell::new(0, 1)), Some(2));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_clue_out_of_range_rejected() {
        let def = SlitherlinkDefinition {
            shape: (2, 2),
            clues: vec![Clue { row: 0, col: 0, val: 4 }],
        };
        assert!(def.validate().is_err());

        let def = SlitherlinkDefinition {
            shape: (2, 2),
            clues: vec![Clue { row: 2, col: 0, val: 1 }],
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_galaxies_shared_center_rejected() {
        let def = GalaxiesDefinition {
            shape: (3, 3),
            galaxies: vec![vec![Cell::new(1, 1)], vec![Cell::new(1, 1), Cell::new(1, 2)]],
        };
        assert!(def.regions().is_err());
    }

    #[test]
    fn test_l_shaped_center_is_malformed() {
        let def = GalaxiesDefinition {
            shape: (4, 4),
            galaxies: vec![vec![
                Cell::new(0, 0),
                Cell::new(1, 0),
                Cell::new(2, 0),
                Cell::new(2, 1),
            ]],
        };
        let err = def.regions().unwrap_err();
        let malformed = err.downcast_ref::<SolveError>();
        assert!(matches!(malformed, Some(SolveError::MalformedRegion { region: 0, .. })));
    }
}
