//! One puzzle instance from definition to validated solution

use super::contributor::{apply_all, ConstraintContributor};
use super::definition::PuzzleDefinition;
use super::galaxies::{self, RegionLayout};
use super::slitherlink;
use super::solution::{LoopSolution, PuzzleSolution, RegionSolution};
use super::validator::SolutionValidator;
use crate::config::Settings;
use crate::cycles::SubtourEliminator;
use crate::error::SolveError;
use crate::grid::{load_puzzle_from_file, Cell, GridTopology};
use crate::model::{create_backend, IlpBackend, ModelBuilder, SolveStatus, VariableStatistics};
use crate::regions::{Centroid, ConnectivityEngine};
use anyhow::{Context, Result};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, warn};

/// A loaded puzzle together with the settings to solve it
pub struct PuzzleProblem {
    settings: Settings,
    definition: PuzzleDefinition,
    validator: SolutionValidator,
}

impl PuzzleProblem {
    /// Load the puzzle named by `settings.input.puzzle_file`
    pub fn new(settings: Settings) -> Result<Self> {
        let definition = load_puzzle_from_file(&settings.input.puzzle_file)
            .context("Failed to load puzzle file")?;
        Self::with_definition(settings, definition)
    }

    /// Create a problem with an explicit definition (useful for testing)
    pub fn with_definition(settings: Settings, definition: PuzzleDefinition) -> Result<Self> {
        definition.validate().context("Puzzle definition is invalid")?;
        Ok(Self {
            settings,
            definition,
            validator: SolutionValidator::new(),
        })
    }

    pub fn definition(&self) -> &PuzzleDefinition {
        &self.definition
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn topology(&self) -> Result<GridTopology> {
        self.definition.topology()
    }

    fn contributors(&self) -> Result<Vec<Box<dyn ConstraintContributor>>> {
        Ok(match &self.definition {
            PuzzleDefinition::Slitherlink(def) => slitherlink::contributors(def),
            PuzzleDefinition::Galaxies(def) => {
                let layout = RegionLayout::new(def.regions()?, &def.topology()?);
                galaxies::contributors(Rc::new(layout))
            }
        })
    }

    /// Fresh model with every static constraint applied
    pub fn build_model(&self, backend: Box<dyn IlpBackend>) -> Result<(ModelBuilder, Vec<(&'static str, usize)>)> {
        let mut builder = ModelBuilder::new(self.topology()?, backend);
        let contributions = apply_all(&self.contributors()?, &mut builder)?;
        Ok((builder, contributions))
    }

    /// Solve with the configured backend
    pub fn solve(&self) -> Result<PuzzleSolution> {
        let backend = create_backend(self.settings.solver.backend)?;
        self.solve_with_backend(backend)
    }

    pub fn solve_with_backend(&self, backend: Box<dyn IlpBackend>) -> Result<PuzzleSolution> {
        let start_time = Instant::now();
        let topology = self.topology()?;
        info!(puzzle = self.definition.name(), grid = %topology, "solving puzzle");

        let (mut builder, _) = self.build_model(backend)?;
        info!(
            variables = builder.variable_count(),
            constraints = builder.constraint_count(),
            backend = builder.backend_name(),
            "model built"
        );

        let solution = match &self.definition {
            PuzzleDefinition::Slitherlink(_) => {
                let eliminator = SubtourEliminator::new(self.settings.solver.max_cut_iterations);
                let outcome = eliminator.run(&mut builder)?;
                PuzzleSolution::Loop(LoopSolution::from_outcome(&builder, &outcome, start_time.elapsed()))
            }
            PuzzleDefinition::Galaxies(_) => match builder.solve()? {
                SolveStatus::Optimal(assignment) => PuzzleSolution::Regions(RegionSolution::from_assignment(
                    &builder,
                    &assignment,
                    start_time.elapsed(),
                )?),
                SolveStatus::Infeasible => return Err(SolveError::ModelInfeasible.into()),
            },
        };

        let validation = self.validator.validate(&self.definition, &solution)?;
        if !validation.is_valid {
            warn!(violations = validation.violations.len(), "solver output failed validation");
            anyhow::bail!(
                "Solver returned an invalid solution: {}",
                validation.error_message().unwrap_or("unknown violation")
            );
        }

        info!(
            elapsed_ms = solution.solve_time().as_millis() as u64,
            solver_calls = solution.summary().solver_calls,
            "puzzle solved"
        );
        Ok(solution)
    }

    /// Model size and per-region path counts, without solving
    pub fn analyze(&self) -> Result<ProblemAnalysis> {
        let topology = self.topology()?;
        let (builder, contributions) = self.build_model(create_backend(self.settings.solver.backend)?)?;

        let regions = match &self.definition {
            PuzzleDefinition::Slitherlink(_) => Vec::new(),
            PuzzleDefinition::Galaxies(def) => {
                let layout = RegionLayout::new(def.regions()?, &topology);
                layout
                    .iter()
                    .map(|(region, candidates)| {
                        let survey = ConnectivityEngine::new(region, candidates).survey();
                        RegionAnalysis {
                            index: region.index(),
                            centers: region.centers().to_vec(),
                            centroid: region.centroid(),
                            candidates: candidates.len(),
                            sources: survey.len(),
                            paths: survey.iter().map(|(_, n)| n).sum(),
                            unreachable: survey.iter().filter(|(_, n)| *n == 0).map(|(c, _)| *c).collect(),
                        }
                    })
                    .collect()
            }
        };

        Ok(ProblemAnalysis {
            puzzle: self.definition.name(),
            topology,
            variables: builder.variables().statistics(),
            constraints: builder.constraint_count(),
            contributions,
            regions,
        })
    }
}

/// Static size of a puzzle model
#[derive(Debug, Clone)]
pub struct ProblemAnalysis {
    pub puzzle: &'static str,
    pub topology: GridTopology,
    pub variables: VariableStatistics,
    pub constraints: usize,
    pub contributions: Vec<(&'static str, usize)>,
    pub regions: Vec<RegionAnalysis>,
}

#[derive(Debug, Clone)]
pub struct RegionAnalysis {
    pub index: usize,
    pub centers: Vec<Cell>,
    pub centroid: Centroid,
    pub candidates: usize,
    pub sources: usize,
    pub paths: usize,
    pub unreachable: Vec<Cell>,
}

impl fmt::Display for ProblemAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Puzzle: {} ({})", self.puzzle, self.topology)?;
        writeln!(f, "Constraints: {}", self.constraints)?;
        for (name, count) in &self.contributions {
            writeln!(f, "  {}: {}", name, count)?;
        }
        write!(f, "{}", self.variables)?;
        for region in &self.regions {
            writeln!(
                f,
                "Galaxy {} centroid {}: {} candidates, {} sources, {} paths, {} unreachable",
                region.index,
                region.centroid,
                region.candidates,
                region.sources,
                region.paths,
                region.unreachable.len()
            )?;
        }
        Ok(())
    }
}
