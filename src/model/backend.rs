//! Integer-program solver backends

use super::{Constraint, Relation, VarId, VariableManager};
use crate::config::SolverBackend;
use crate::error::SolveError;
use good_lp::solvers::microlp::microlp;
use good_lp::{variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use std::time::{Duration, Instant};

/// Frozen 0/1 value of every variable after a successful solve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Value of `var`; variables unknown to the snapshot read as 0
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn ones(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }
}

/// Outcome of one full optimization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal(Assignment),
    Infeasible,
}

/// Something that can decide a boolean linear model.
///
/// Every call is a full re-optimization of the given variables and constraints.
pub trait IlpBackend {
    fn name(&self) -> &'static str;

    fn solve(&mut self, variables: &VariableManager, constraints: &[Constraint]) -> Result<SolveStatus, SolveError>;
}

/// Pure-Rust branch-and-bound through `good_lp`'s microlp solver
#[derive(Debug, Default)]
pub struct MicroLpBackend {
    solve_count: usize,
    total_time: Duration,
}

impl MicroLpBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solve_count(&self) -> usize {
        self.solve_count
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }
}

impl IlpBackend for MicroLpBackend {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&mut self, variables: &VariableManager, constraints: &[Constraint]) -> Result<SolveStatus, SolveError> {
        let start = Instant::now();
        let (problem, vars) = declare_binaries(variables);

        let objective: Expression = 0.into();
        let mut model = problem.minimise(objective).using(microlp);
        for constraint in constraints {
            model.add_constraint(translate(constraint, &vars));
        }

        let result = model.solve();
        self.solve_count += 1;
        self.total_time += start.elapsed();

        match result {
            Ok(solution) => Ok(SolveStatus::Optimal(read_assignment(&solution, &vars))),
            Err(ResolutionError::Infeasible) => Ok(SolveStatus::Infeasible),
            Err(e) => Err(SolveError::Backend {
                backend: self.name(),
                message: e.to_string(),
            }),
        }
    }
}

/// COIN-OR CBC through `good_lp`; needs the system CBC library
#[cfg(feature = "coin_cbc")]
#[derive(Debug, Default)]
pub struct CbcBackend;

#[cfg(feature = "coin_cbc")]
impl IlpBackend for CbcBackend {
    fn name(&self) -> &'static str {
        "cbc"
    }

    fn solve(&mut self, variables: &VariableManager, constraints: &[Constraint]) -> Result<SolveStatus, SolveError> {
        let (problem, vars) = declare_binaries(variables);

        let objective: Expression = 0.into();
        let mut model = problem
            .minimise(objective)
            .using(good_lp::solvers::coin_cbc::coin_cbc);
        model.set_parameter("log", "0");
        for constraint in constraints {
            model.add_constraint(translate(constraint, &vars));
        }

        match model.solve() {
            Ok(solution) => Ok(SolveStatus::Optimal(read_assignment(&solution, &vars))),
            Err(ResolutionError::Infeasible) => Ok(SolveStatus::Infeasible),
            Err(e) => Err(SolveError::Backend {
                backend: self.name(),
                message: e.to_string(),
            }),
        }
    }
}

/// Create a backend instance for the configured solver
pub fn create_backend(backend: SolverBackend) -> Result<Box<dyn IlpBackend>, SolveError> {
    match backend {
        SolverBackend::MicroLp => Ok(Box::new(MicroLpBackend::new())),
        #[cfg(feature = "coin_cbc")]
        SolverBackend::Cbc => Ok(Box::new(CbcBackend)),
        #[cfg(not(feature = "coin_cbc"))]
        SolverBackend::Cbc => Err(SolveError::BackendUnavailable("cbc".to_string())),
    }
}

fn declare_binaries(variables: &VariableManager) -> (ProblemVariables, Vec<Variable>) {
    let mut problem = ProblemVariables::new();
    let vars = (0..variables.variable_count())
        .map(|_| problem.add(variable().binary()))
        .collect();
    (problem, vars)
}

fn translate(constraint: &Constraint, vars: &[Variable]) -> good_lp::Constraint {
    let mut lhs: Expression = 0.into();
    for &(var, coefficient) in &constraint.expr.terms {
        lhs += coefficient as f64 * vars[var.index()];
    }
    let rhs = constraint.rhs as f64;

    match constraint.relation {
        Relation::LessEq => good_lp::constraint::leq(lhs, rhs),
        Relation::GreaterEq => good_lp::constraint::geq(lhs, rhs),
        Relation::Equal => good_lp::constraint::eq(lhs, rhs),
    }
}

fn read_assignment<S: Solution>(solution: &S, vars: &[Variable]) -> Assignment {
    Assignment::new(vars.iter().map(|&v| solution.value(v) > 0.5).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Corner, GridTopology};
    use crate::model::VariableRole;

    fn two_points() -> (VariableManager, VarId, VarId) {
        let mut vm = VariableManager::new(GridTopology::new(1, 1).unwrap());
        let a = vm.get_variable(VariableRole::Point(Corner::new(0, 0))).unwrap();
        let b = vm.get_variable(VariableRole::Point(Corner::new(0, 1))).unwrap();
        (vm, a, b)
    }

    #[test]
    fn test_simple_feasible() {
        let (vm, a, b) = two_points();
        let constraints = vec![Constraint::at_least([a, b], 1), Constraint::fix(a, false)];

        let mut backend = MicroLpBackend::new();
        match backend.solve(&vm, &constraints).unwrap() {
            SolveStatus::Optimal(assignment) => {
                assert!(!assignment.value(a));
                assert!(assignment.value(b));
            }
            SolveStatus::Infeasible => panic!("model is feasible"),
        }
        assert_eq!(backend.solve_count(), 1);
    }

    #[test]
    fn test_infeasible() {
        let (vm, a, _) = two_points();
        let constraints = vec![Constraint::fix(a, true), Constraint::fix(a, false)];

        let mut backend = MicroLpBackend::new();
        assert_eq!(backend.solve(&vm, &constraints).unwrap(), SolveStatus::Infeasible);
    }

    #[test]
    fn test_factory() {
        let backend = create_backend(SolverBackend::MicroLp).unwrap();
        assert_eq!(backend.name(), "microlp");

        #[cfg(not(feature = "coin_cbc"))]
        assert!(matches!(
            create_backend(SolverBackend::Cbc),
            Err(SolveError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn test_assignment_defaults_to_zero() {
        let assignment = Assignment::new(vec![true, false]);
        assert!(assignment.value(VarId(0)));
        assert!(!assignment.value(VarId(5)));
        assert_eq!(assignment.ones(), 1);
    }
}
