//! Owns one puzzle instance's variables and constraints

use super::{Constraint, IlpBackend, SolveStatus, VarId, VariableManager, VariableRole, VariableStatistics};
use crate::error::SolveError;
use crate::grid::GridTopology;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Thin layer over an [`IlpBackend`]: allocates variables by role, accumulates
/// constraints, and re-solves the whole model on every [`ModelBuilder::solve`].
pub struct ModelBuilder {
    variables: VariableManager,
    constraints: Vec<Constraint>,
    backend: Box<dyn IlpBackend>,
    trivially_infeasible: bool,
    solve_count: usize,
    solve_time: Duration,
}

impl ModelBuilder {
    pub fn new(topology: GridTopology, backend: Box<dyn IlpBackend>) -> Self {
        Self {
            variables: VariableManager::new(topology),
            constraints: Vec::new(),
            backend,
            trivially_infeasible: false,
            solve_count: 0,
            solve_time: Duration::ZERO,
        }
    }

    /// Get or create the variable for `role`
    pub fn add_variable(&mut self, role: VariableRole) -> Result<VarId, SolveError> {
        self.variables.get_variable(role)
    }

    pub fn lookup(&self, role: &VariableRole) -> Option<VarId> {
        self.variables.lookup(role)
    }

    /// Register a constraint. Constraints without terms are decided here.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        if constraint.expr.is_empty() {
            if !constraint.is_satisfied_by(|_| false) {
                warn!(constraint = %constraint, "constant constraint can never hold");
                self.trivially_infeasible = true;
            }
            return;
        }
        self.constraints.push(constraint);
    }

    pub fn add_constraints<I: IntoIterator<Item = Constraint>>(&mut self, constraints: I) {
        for constraint in constraints {
            self.add_constraint(constraint);
        }
    }

    /// Full re-optimization of the current model
    pub fn solve(&mut self) -> Result<SolveStatus, SolveError> {
        if self.trivially_infeasible {
            return Ok(SolveStatus::Infeasible);
        }

        debug!(
            backend = self.backend.name(),
            variables = self.variables.variable_count(),
            constraints = self.constraints.len(),
            "solving model"
        );

        let start = Instant::now();
        let status = self.backend.solve(&self.variables, &self.constraints)?;
        let elapsed = start.elapsed();
        self.solve_count += 1;
        self.solve_time += elapsed;

        debug!(
            optimal = matches!(status, SolveStatus::Optimal(_)),
            elapsed_ms = elapsed.as_millis() as u64,
            "solve finished"
        );
        Ok(status)
    }

    pub fn variables(&self) -> &VariableManager {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn topology(&self) -> &GridTopology {
        self.variables.topology()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.variable_count()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn statistics(&self) -> ModelStatistics {
        ModelStatistics {
            backend: self.backend.name(),
            variables: self.variables.statistics(),
            constraint_count: self.constraints.len(),
            solve_count: self.solve_count,
            solve_time: self.solve_time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelStatistics {
    pub backend: &'static str,
    pub variables: VariableStatistics,
    pub constraint_count: usize,
    pub solve_count: usize,
    pub solve_time: Duration,
}

impl fmt::Display for ModelStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Statistics:")?;
        writeln!(f, "  Backend: {}", self.backend)?;
        writeln!(f, "  Constraints: {}", self.constraint_count)?;
        writeln!(f, "  Solver calls: {}", self.solve_count)?;
        writeln!(f, "  Solver time: {:.3}s", self.solve_time.as_secs_f64())?;
        write!(f, "{}", self.variables)
    }
}
