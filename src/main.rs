//! Command line front end for the grid puzzle solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grid_puzzle_ilp::{
    config::{CliOverrides, OutputFormat, Settings, SolverBackend},
    grid::{create_example_puzzles, load_puzzle_from_file, load_puzzles_from_directory},
    puzzles::{PuzzleProblem, PuzzleSolution, SolutionValidator},
    utils::{ColorOutput, SolutionFormatter},
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_puzzle_ilp")]
#[command(about = "Grid puzzle solver built on 0/1 integer programming")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single puzzle
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file (overrides config)
        #[arg(short, long)]
        puzzle: Option<PathBuf>,

        /// Solver backend (overrides config)
        #[arg(short, long, value_enum)]
        backend: Option<SolverBackend>,

        /// Maximum subtour cut rounds (overrides config)
        #[arg(short, long)]
        max_iterations: Option<usize>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Solve every puzzle file in a directory in parallel
    Batch {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Directory of puzzle JSON files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Check a saved solution against its puzzle
    Validate {
        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Solution JSON file
        #[arg(short, long)]
        solution: PathBuf,
    },

    /// Report model size and region path counts without solving
    Analyze {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,
    },

    /// Create example configuration and puzzle files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            puzzle,
            backend,
            max_iterations,
            output,
            format,
            verbose,
        } => {
            let overrides = CliOverrides {
                max_cut_iterations: max_iterations,
                backend,
                puzzle_file: puzzle,
                output_dir: output,
                format,
                verbose,
            };
            solve_command(config, overrides)
        }
        Commands::Batch { config, dir, output, format } => {
            let overrides = CliOverrides {
                output_dir: output,
                format,
                ..CliOverrides::default()
            };
            batch_command(config, dir, overrides)
        }
        Commands::Validate { puzzle, solution } => validate_command(puzzle, solution),
        Commands::Analyze { config, puzzle } => analyze_command(config, puzzle),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn load_settings(config_path: &Path, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!("Config file {} not found, using defaults", config_path.display()))
        );
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn solution_name(puzzle_file: &Path) -> String {
    puzzle_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "solution".to_string())
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;
    init_tracing(&settings.logging.level);
    settings.ensure_puzzle_file()?;

    println!(
        "{}",
        ColorOutput::info(&format!("Solving {}", settings.input.puzzle_file.display()))
    );

    let problem = PuzzleProblem::new(settings.clone()).context("Failed to load puzzle")?;
    if overrides.verbose {
        println!("{}", problem.analyze()?);
    }

    let start_time = Instant::now();
    let solution = problem.solve().context("Failed to solve puzzle")?;
    println!(
        "{}",
        ColorOutput::success(&format!("Solved in {:.3}s", start_time.elapsed().as_secs_f64()))
    );
    println!("\n{}", SolutionFormatter::format_solution(&solution, Some(problem.definition())));

    let path = SolutionFormatter::save_solution(
        &solution,
        Some(problem.definition()),
        &solution_name(&settings.input.puzzle_file),
        &settings.output.output_directory,
        settings.output.format,
    )
    .context("Failed to save solution")?;
    println!("{}", ColorOutput::success(&format!("Solution saved to {}", path.display())));

    Ok(())
}

fn batch_command(config_path: PathBuf, dir: PathBuf, overrides: CliOverrides) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;
    init_tracing(&settings.logging.level);

    let puzzles = load_puzzles_from_directory(&dir)?;
    if puzzles.is_empty() {
        println!("{}", ColorOutput::warning(&format!("No puzzles found in {}", dir.display())));
        return Ok(());
    }
    println!("{}", ColorOutput::info(&format!("Solving {} puzzles", puzzles.len())));

    // Each worker owns its model and backend
    let results: Vec<(String, Result<PuzzleSolution>)> = puzzles
        .par_iter()
        .map(|(path, definition)| {
            let result = PuzzleProblem::with_definition(settings.clone(), definition.clone())
                .and_then(|problem| problem.solve());
            (solution_name(path), result)
        })
        .collect();

    let mut solved = Vec::new();
    let mut failures = 0;
    for ((name, result), (_, definition)) in results.into_iter().zip(&puzzles) {
        match result {
            Ok(solution) => {
                SolutionFormatter::save_solution(
                    &solution,
                    Some(definition),
                    &name,
                    &settings.output.output_directory,
                    settings.output.format,
                )?;
                solved.push((name, solution));
            }
            Err(err) => {
                failures += 1;
                println!("{}", ColorOutput::error(&format!("{}: {:#}", name, err)));
            }
        }
    }

    println!("\n{}", SolutionFormatter::format_summary(&solved));
    if failures > 0 {
        anyhow::bail!("{} of {} puzzles failed", failures, puzzles.len());
    }
    println!(
        "{}",
        ColorOutput::success(&format!(
            "All puzzles solved; output in {}",
            settings.output.output_directory.display()
        ))
    );
    Ok(())
}

fn validate_command(puzzle_path: PathBuf, solution_path: PathBuf) -> Result<()> {
    println!("{}", ColorOutput::info("Validating solution..."));

    let definition = load_puzzle_from_file(&puzzle_path)?;
    let solution = PuzzleSolution::load_from_file(&solution_path)?;
    let result = SolutionValidator::new()
        .validate(&definition, &solution)
        .context("Validation failed")?;

    println!("{}", result);
    println!("{}", SolutionFormatter::format_solution(&solution, Some(&definition)));

    if result.is_valid {
        println!("{}", ColorOutput::success("Solution is valid"));
        Ok(())
    } else {
        println!("{}", ColorOutput::error("Solution is invalid"));
        anyhow::bail!(
            "{} violation(s) in {}",
            result.violations.len(),
            solution_path.display()
        )
    }
}

fn analyze_command(config_path: PathBuf, puzzle_path: PathBuf) -> Result<()> {
    let overrides = CliOverrides {
        puzzle_file: Some(puzzle_path),
        ..CliOverrides::default()
    };
    let settings = load_settings(&config_path, &overrides)?;
    init_tracing(&settings.logging.level);

    println!("{}", ColorOutput::info("Analyzing puzzle..."));
    let problem = PuzzleProblem::new(settings).context("Failed to load puzzle")?;
    println!("{}", problem.analyze()?);
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let puzzle_dir = directory.join("puzzles");
    let output_dir = directory.join("output/solutions");

    for dir in [&config_dir, &puzzle_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let written = create_example_puzzles(&puzzle_dir).context("Failed to create example puzzles")?;
    println!("Created {} example puzzles in: {}", written.len(), puzzle_dir.display());

    let mut galaxies = Settings::default();
    galaxies.input.puzzle_file = PathBuf::from("puzzles/galaxies_4x4.json");
    galaxies.output.format = OutputFormat::Json;
    galaxies.to_file(config_dir.join("examples/galaxies.yaml"))?;
    println!("Created example configurations in: {}", config_dir.join("examples").display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: grid_puzzle_ilp solve --config config/default.yaml");
    println!("3. Run: grid_puzzle_ilp batch --dir puzzles");

    Ok(())
}
