//! Board rendering and solution output

use crate::config::OutputFormat;
use crate::grid::{Cell, Edge};
use crate::puzzles::{
    GalaxiesDefinition, LoopSolution, PuzzleDefinition, PuzzleSolution, RegionSolution, SlitherlinkDefinition,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Plain-text rendering of solved boards
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Header with solver figures followed by the board
    pub fn format_solution(solution: &PuzzleSolution, definition: Option<&PuzzleDefinition>) -> String {
        let summary = solution.summary();
        let mut output = String::new();

        output.push_str(&format!("=== {} solution ===\n", solution.kind()));
        output.push_str(&format!("Solve Time: {:.3}s\n", solution.solve_time().as_secs_f64()));
        output.push_str(&format!("Backend: {}\n", summary.backend));
        output.push_str(&format!("Solver Calls: {}\n", summary.solver_calls));
        output.push_str(&format!(
            "Model: {} variables, {} constraints\n",
            summary.variables, summary.constraints
        ));

        let board = match (solution, definition) {
            (PuzzleSolution::Loop(sol), def) => {
                output.push_str(&format!(
                    "Loop Length: {} ({} cut rounds, {} cuts)\n",
                    sol.loop_length(),
                    sol.cut_rounds,
                    sol.cuts_added
                ));
                let clues = match def {
                    Some(PuzzleDefinition::Slitherlink(d)) => Some(d),
                    _ => None,
                };
                Self::format_loop(sol, clues)
            }
            (PuzzleSolution::Regions(sol), def) => {
                output.push_str(&format!("Galaxies: {}\n", sol.region_count()));
                let centers = match def {
                    Some(PuzzleDefinition::Galaxies(d)) => Some(d),
                    _ => None,
                };
                Self::format_regions(sol, centers)
            }
        };

        output.push('\n');
        output.push_str(&board);
        output
    }

    /// Corner lattice with drawn edges; clue digits inside their cells
    pub fn format_loop(solution: &LoopSolution, definition: Option<&SlitherlinkDefinition>) -> String {
        let (rows, cols) = solution.shape;
        let mut output = String::new();

        for row in 0..=rows {
            output.push('+');
            for col in 0..cols {
                output.push_str(if solution.is_active(Edge::horizontal(row, col)) { "---" } else { "   " });
                output.push('+');
            }
            output.push('\n');

            if row == rows {
                break;
            }
            for col in 0..=cols {
                output.push(if solution.is_active(Edge::vertical(row, col)) { '|' } else { ' ' });
                if col < cols {
                    match definition.and_then(|d| d.clue_at(Cell::new(row, col))) {
                        Some(clue) => output.push_str(&format!(" {} ", clue)),
                        None => output.push_str("   "),
                    }
                }
            }
            output.push('\n');
        }

        output
    }

    /// Cells separated by walls wherever ownership changes; centers marked `*`
    pub fn format_regions(solution: &RegionSolution, definition: Option<&GalaxiesDefinition>) -> String {
        let (rows, cols) = solution.shape;
        let is_center = |cell: Cell| {
            definition.is_some_and(|d| d.galaxies.iter().any(|centers| centers.contains(&cell)))
        };
        let differs = |a: Cell, b: Cell| solution.owner(a) != solution.owner(b);
        let mut output = String::new();

        for row in 0..=rows {
            output.push('+');
            for col in 0..cols {
                let wall = row == 0 || row == rows || differs(Cell::new(row - 1, col), Cell::new(row, col));
                output.push_str(if wall { "---" } else { "   " });
                output.push('+');
            }
            output.push('\n');

            if row == rows {
                break;
            }
            output.push('|');
            for col in 0..cols {
                let cell = Cell::new(row, col);
                output.push_str(if is_center(cell) { " * " } else { "   " });
                let wall = col + 1 == cols || differs(cell, Cell::new(row, col + 1));
                output.push(if wall { '|' } else { ' ' });
            }
            output.push('\n');
        }

        output
    }

    /// One line per solved puzzle
    pub fn format_summary(results: &[(String, PuzzleSolution)]) -> String {
        let mut output = String::new();

        output.push_str("Puzzle               | Kind    | Time(ms) | Calls | Vars  | Constraints\n");
        output.push_str("---------------------|---------|----------|-------|-------|------------\n");
        for (name, solution) in results {
            let summary = solution.summary();
            output.push_str(&format!(
                "{:20} | {:7} | {:8} | {:5} | {:5} | {}\n",
                name,
                solution.kind(),
                solution.solve_time().as_millis(),
                summary.solver_calls,
                summary.variables,
                summary.constraints
            ));
        }

        output
    }

    /// Write one solution to `output_dir` as `<name>.txt` or `<name>.json`
    pub fn save_solution<P: AsRef<Path>>(
        solution: &PuzzleSolution,
        definition: Option<&PuzzleDefinition>,
        name: &str,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

        let path = match format {
            OutputFormat::Text => {
                let path = output_dir.join(format!("{}.txt", name));
                std::fs::write(&path, Self::format_solution(solution, definition))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                path
            }
            OutputFormat::Json => {
                let path = output_dir.join(format!("{}.json", name));
                solution.save_to_file(&path)?;
                path
            }
        };

        Ok(path)
    }
}

/// ANSI-colored status messages, plain when `NO_COLOR` is set or `TERM=dumb`
pub struct ColorOutput;

impl ColorOutput {
    pub fn paint(text: &str, color: Color) -> String {
        if Self::enabled() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn enabled() -> bool {
        std::env::var_os("NO_COLOR").is_none() && std::env::var("TERM").map_or(true, |term| term != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::paint(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::paint(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::paint(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::paint(text, Color::Cyan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Cyan,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Cyan => 36,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridTopology;
    use crate::puzzles::Clue;
    use tempfile::tempdir;

    fn unit_loop() -> LoopSolution {
        LoopSolution::from_edges(
            GridTopology::new(1, 2).unwrap(),
            [
                Edge::horizontal(0, 0),
                Edge::horizontal(1, 0),
                Edge::vertical(0, 0),
                Edge::vertical(0, 1),
            ],
        )
    }

    #[test]
    fn test_loop_rendering() {
        let definition = SlitherlinkDefinition {
            shape: (1, 2),
            clues: vec![Clue { row: 0, col: 1, val: 1 }],
        };
        let board = SolutionFormatter::format_loop(&unit_loop(), Some(&definition));
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines, vec!["+---+   +", "|   | 1  ", "+---+   +"]);
    }

    #[test]
    fn test_region_rendering() {
        let solution = RegionSolution::from_owners(vec![vec![0, 1], vec![0, 1]]);
        let definition = GalaxiesDefinition {
            shape: (2, 2),
            galaxies: vec![vec![Cell::new(0, 0), Cell::new(1, 0)], vec![Cell::new(0, 1), Cell::new(1, 1)]],
        };
        let board = SolutionFormatter::format_regions(&solution, Some(&definition));
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines[0], "+---+---+");
        assert_eq!(lines[1], "| * | * |");
        assert_eq!(lines[2], "+   +   +");
        assert_eq!(lines[4], "+---+---+");
    }

    #[test]
    fn test_save_text_and_json() {
        let temp_dir = tempdir().unwrap();
        let solution = PuzzleSolution::Loop(unit_loop());

        let text = SolutionFormatter::save_solution(&solution, None, "unit", temp_dir.path(), OutputFormat::Text)
            .unwrap();
        assert!(std::fs::read_to_string(text).unwrap().contains("=== loop solution ==="));

        let json = SolutionFormatter::save_solution(&solution, None, "unit", temp_dir.path(), OutputFormat::Json)
            .unwrap();
        let loaded = PuzzleSolution::load_from_file(json).unwrap();
        assert_eq!(loaded.kind(), "loop");
    }

    #[test]
    fn test_summary_table() {
        let table = SolutionFormatter::format_summary(&[("unit".to_string(), PuzzleSolution::Loop(unit_loop()))]);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("unit"));
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::paint("test", Color::Red);
        assert!(colored.contains("test"));
    }
}
