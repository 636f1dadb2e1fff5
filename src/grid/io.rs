//! File I/O for puzzle definitions

use crate::grid::Cell;
use crate::puzzles::{Clue, GalaxiesDefinition, PuzzleDefinition, SlitherlinkDefinition};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Load a puzzle definition from a JSON file
pub fn load_puzzle_from_file<P: AsRef<Path>>(path: P) -> Result<PuzzleDefinition> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;

    parse_puzzle_from_str(&content)
        .with_context(|| format!("Failed to parse puzzle from file: {}", path.as_ref().display()))
}

/// Parse and validate a puzzle definition
pub fn parse_puzzle_from_str(content: &str) -> Result<PuzzleDefinition> {
    let definition: PuzzleDefinition = serde_json::from_str(content)
        .context("Puzzle file is not a valid puzzle definition")?;
    definition.validate()?;
    Ok(definition)
}

/// Save a puzzle definition as pretty-printed JSON
pub fn save_puzzle_to_file<P: AsRef<Path>>(definition: &PuzzleDefinition, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(definition)
        .context("Failed to serialize puzzle definition")?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write puzzle to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Load every `*.json` puzzle in a directory, sorted by file name.
/// Files that fail to load are skipped with a warning.
pub fn load_puzzles_from_directory<P: AsRef<Path>>(dir_path: P) -> Result<Vec<(PathBuf, PuzzleDefinition)>> {
    let dir = std::fs::read_dir(&dir_path)
        .with_context(|| format!("Failed to read directory: {}", dir_path.as_ref().display()))?;

    let mut puzzles = Vec::new();

    for entry in dir {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            match load_puzzle_from_file(&path) {
                Ok(definition) => puzzles.push((path, definition)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable puzzle"),
            }
        }
    }

    puzzles.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(puzzles)
}

/// Small puzzles with known solutions, keyed by file stem
pub fn example_puzzles() -> Vec<(&'static str, PuzzleDefinition)> {
    // Loop around the L-shaped block {(0,0), (0,1), (0,2), (1,0), (2,0)}
    let l_loop = [[2, 2, 3], [2, 2, 1], [3, 1, 0]];
    let clues = l_loop
        .iter()
        .enumerate()
        .flat_map(|(row, vals)| {
            vals.iter()
                .enumerate()
                .map(move |(col, &val)| Clue { row, col, val })
        })
        .collect();

    vec![
        (
            "slitherlink_3x3",
            PuzzleDefinition::Slitherlink(SlitherlinkDefinition { shape: (3, 3), clues }),
        ),
        (
            "slitherlink_2x2",
            PuzzleDefinition::Slitherlink(SlitherlinkDefinition {
                shape: (2, 2),
                clues: vec![
                    Clue { row: 0, col: 0, val: 2 },
                    Clue { row: 0, col: 1, val: 2 },
                    Clue { row: 1, col: 0, val: 2 },
                    Clue { row: 1, col: 1, val: 2 },
                ],
            }),
        ),
        (
            "galaxies_3x3",
            PuzzleDefinition::Galaxies(GalaxiesDefinition {
                shape: (3, 3),
                galaxies: vec![
                    vec![Cell::new(0, 0)],
                    vec![Cell::new(1, 1)],
                    vec![Cell::new(2, 2)],
                ],
            }),
        ),
        (
            "galaxies_4x4",
            PuzzleDefinition::Galaxies(GalaxiesDefinition {
                shape: (4, 4),
                galaxies: vec![
                    vec![Cell::new(0, 1), Cell::new(0, 2)],
                    vec![Cell::new(2, 0)],
                    vec![Cell::new(2, 2)],
                ],
            }),
        ),
    ]
}

/// Write the example puzzles into `dir`
pub fn create_example_puzzles<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut written = Vec::new();
    for (stem, definition) in example_puzzles() {
        let path = dir.join(format!("{}.json", stem));
        save_puzzle_to_file(&definition, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_galaxies() {
        let json = r#"{
            "puzzle": "galaxies",
            "shape": [3, 3],
            "galaxies": [[{"row": 1, "col": 1}]]
        }"#;
        let def = parse_puzzle_from_str(json).unwrap();
        assert_eq!(def.name(), "galaxies");
        assert_eq!(def.topology().unwrap().cell_count(), 9);
    }

    #[test]
    fn test_parse_rejects_unknown_family() {
        let json = r#"{"puzzle": "sudoku", "shape": [9, 9]}"#;
        assert!(parse_puzzle_from_str(json).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_definition() {
        let json = r#"{"puzzle": "galaxies", "shape": [3, 3], "galaxies": []}"#;
        assert!(parse_puzzle_from_str(json).is_err());
    }

    #[test]
    fn test_examples_are_valid() {
        for (stem, def) in example_puzzles() {
            assert!(def.validate().is_ok(), "{} should validate", stem);
        }
    }

    #[test]
    fn test_directory_round_trip() {
        let temp_dir = tempdir().unwrap();
        let written = create_example_puzzles(temp_dir.path()).unwrap();
        std::fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_puzzles_from_directory(temp_dir.path()).unwrap();
        assert_eq!(loaded.len(), written.len());

        let examples = example_puzzles();
        for (path, def) in &loaded {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap();
            let expected = examples.iter().find(|(name, _)| *name == stem).unwrap();
            assert_eq!(&expected.1, def);
        }
    }
}
