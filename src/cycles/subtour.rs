//! Lazy subtour elimination for single-loop puzzles

use super::decompose::{decompose_cycles, Cycle};
use crate::error::SolveError;
use crate::grid::Edge;
use crate::model::{Assignment, Constraint, ModelBuilder, SolveStatus, VariableRole};
use tracing::{debug, info};

/// Phase of the solve/check/cut loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Solving,
    Checking(Assignment),
    Cutting(Vec<Cycle>),
    Done(Assignment, Cycle),
    Infeasible,
}

/// Result of a converged loop search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub assignment: Assignment,
    pub cycle: Cycle,
    /// Number of rounds in which cuts were added; zero when the first solve was already one loop
    pub cut_rounds: usize,
    pub cuts_added: usize,
    /// Component count observed after each solve
    pub component_history: Vec<usize>,
}

/// Repeatedly solves the model and forbids every disconnected sub-loop
/// until the active edges form exactly one cycle.
#[derive(Debug, Clone, Copy)]
pub struct SubtourEliminator {
    max_iterations: usize,
}

impl SubtourEliminator {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn run(&self, builder: &mut ModelBuilder) -> Result<LoopOutcome, SolveError> {
        let mut state = LoopState::Solving;
        let mut cut_rounds = 0;
        let mut cuts_added = 0;
        let mut component_history = Vec::new();

        loop {
            state = match state {
                LoopState::Solving => match builder.solve()? {
                    SolveStatus::Optimal(assignment) => LoopState::Checking(assignment),
                    SolveStatus::Infeasible => LoopState::Infeasible,
                },
                LoopState::Checking(assignment) => {
                    let active = active_edges(builder, &assignment);
                    let mut cycles = decompose_cycles(&active);
                    component_history.push(cycles.len());
                    debug!(
                        active_edges = active.len(),
                        components = cycles.len(),
                        round = cut_rounds,
                        "checked assignment"
                    );

                    match cycles.len() {
                        0 => return Err(SolveError::EmptyLoop),
                        1 => match cycles.pop() {
                            Some(cycle) => LoopState::Done(assignment, cycle),
                            None => return Err(SolveError::EmptyLoop),
                        },
                        _ if cut_rounds >= self.max_iterations => {
                            return Err(SolveError::LoopDidNotConverge { iterations: cut_rounds });
                        }
                        _ => LoopState::Cutting(cycles),
                    }
                }
                LoopState::Cutting(cycles) => {
                    for cycle in &cycles {
                        builder.add_constraint(subtour_cut(builder, cycle));
                        cuts_added += 1;
                    }
                    cut_rounds += 1;
                    info!(round = cut_rounds, cuts = cycles.len(), "added subtour cuts");
                    LoopState::Solving
                }
                LoopState::Done(assignment, cycle) => {
                    info!(
                        cut_rounds,
                        cuts_added,
                        loop_length = cycle.len(),
                        "loop converged"
                    );
                    return Ok(LoopOutcome {
                        assignment,
                        cycle,
                        cut_rounds,
                        cuts_added,
                        component_history,
                    });
                }
                LoopState::Infeasible => return Err(SolveError::ModelInfeasible),
            };
        }
    }
}

/// Edges whose variable is set in `assignment`, in variable creation order
pub fn active_edges(builder: &ModelBuilder, assignment: &Assignment) -> Vec<Edge> {
    builder
        .variables()
        .iter()
        .filter_map(|(id, role)| match role {
            VariableRole::Edge(edge) if assignment.value(id) => Some(*edge),
            _ => None,
        })
        .collect()
}

/// At most `len - 1` of the cycle's edges may be active together
pub fn subtour_cut(builder: &ModelBuilder, cycle: &Cycle) -> Constraint {
    let vars = cycle
        .edges()
        .iter()
        .filter_map(|edge| builder.lookup(&VariableRole::Edge(*edge)));
    Constraint::at_most(vars, cycle.len() as i64 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridTopology, Orientation};
    use crate::model::{IlpBackend, VariableManager};
    use std::collections::HashSet;

    /// Replays a fixed list of edge sets, one per solve call
    struct ScriptedBackend {
        script: Vec<Option<Vec<Edge>>>,
        calls: usize,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Option<Vec<Edge>>>) -> Self {
            Self { script, calls: 0 }
        }
    }

    impl IlpBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn solve(&mut self, variables: &VariableManager, _: &[Constraint]) -> Result<SolveStatus, SolveError> {
            let step = self.script.get(self.calls).cloned().flatten();
            self.calls += 1;
            let Some(active) = step else {
                return Ok(SolveStatus::Infeasible);
            };
            let active: HashSet<Edge> = active.into_iter().collect();
            let values = variables
                .iter()
                .map(|(_, role)| matches!(role, VariableRole::Edge(e) if active.contains(e)))
                .collect();
            Ok(SolveStatus::Optimal(Assignment::new(values)))
        }
    }

    fn square(row: usize, col: usize) -> Vec<Edge> {
        vec![
            Edge::horizontal(row, col),
            Edge::vertical(row, col + 1),
            Edge::horizontal(row + 1, col),
            Edge::vertical(row, col),
        ]
    }

    fn builder_for(rows: usize, cols: usize, script: Vec<Option<Vec<Edge>>>) -> ModelBuilder {
        let topology = GridTopology::new(rows, cols).unwrap();
        let mut builder = ModelBuilder::new(topology, Box::new(ScriptedBackend::new(script)));
        for edge in topology.edges() {
            builder.add_variable(VariableRole::Edge(edge)).unwrap();
        }
        builder
    }

    #[test]
    fn test_single_loop_first_try() {
        let mut builder = builder_for(2, 2, vec![Some(square(0, 0))]);
        let outcome = SubtourEliminator::new(10).run(&mut builder).unwrap();
        assert_eq!(outcome.cut_rounds, 0);
        assert_eq!(outcome.cuts_added, 0);
        assert_eq!(outcome.cycle.edge_set(), square(0, 0).into_iter().collect());
        assert_eq!(builder.constraint_count(), 0);
    }

    #[test]
    fn test_two_loops_then_one() {
        let mut two = square(0, 0);
        two.extend(square(2, 2));
        let mut big = Vec::new();
        for col in 0..3 {
            big.push(Edge::horizontal(0, col));
            big.push(Edge::horizontal(3, col));
        }
        for row in 0..3 {
            big.push(Edge::vertical(row, 0));
            big.push(Edge::vertical(row, 3));
        }

        let mut builder = builder_for(3, 3, vec![Some(two), Some(big.clone())]);
        let outcome = SubtourEliminator::new(10).run(&mut builder).unwrap();

        assert_eq!(outcome.cut_rounds, 1);
        assert_eq!(outcome.cuts_added, 2);
        assert_eq!(outcome.component_history, vec![2, 1]);
        assert_eq!(outcome.cycle.len(), big.len());

        // both cuts forbid the full unit square
        assert_eq!(builder.constraint_count(), 2);
        for cut in builder.constraints() {
            assert_eq!(cut.rhs, 3);
            assert_eq!(cut.expr.variables().count(), 4);
        }
    }

    #[test]
    fn test_cut_rejects_the_offending_cycle() {
        let builder = builder_for(2, 2, vec![]);
        let cycle = Cycle::new(square(1, 1));
        let cut = subtour_cut(&builder, &cycle);
        let members: HashSet<_> = cut.expr.variables().collect();

        assert!(!cut.is_satisfied_by(|v| members.contains(&v)));
        // dropping any one edge satisfies it
        let dropped = builder.lookup(&VariableRole::Edge(square(1, 1)[0])).unwrap();
        assert!(cut.is_satisfied_by(|v| v != dropped && members.contains(&v)));
    }

    #[test]
    fn test_iteration_bound() {
        let mut two = square(0, 0);
        two.extend(square(2, 2));
        let script = vec![Some(two.clone()), Some(two.clone()), Some(two)];
        let mut builder = builder_for(3, 3, script);

        let err = SubtourEliminator::new(2).run(&mut builder).unwrap_err();
        assert_eq!(err, SolveError::LoopDidNotConverge { iterations: 2 });
    }

    #[test]
    fn test_infeasible() {
        let mut builder = builder_for(2, 2, vec![None]);
        let err = SubtourEliminator::new(5).run(&mut builder).unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_no_active_edges() {
        let mut builder = builder_for(2, 2, vec![Some(vec![])]);
        assert_eq!(SubtourEliminator::new(5).run(&mut builder), Err(SolveError::EmptyLoop));
    }

    #[test]
    fn test_active_edges_reads_only_edges() {
        let builder = builder_for(1, 1, vec![]);
        let values = builder.variables().iter().map(|(_, role)| match role {
            VariableRole::Edge(e) => e.orientation == Orientation::Horizontal,
            _ => true,
        });
        let assignment = Assignment::new(values.collect());
        let active = active_edges(&builder, &assignment);
        assert_eq!(active, vec![Edge::horizontal(0, 0), Edge::horizontal(1, 0)]);
    }
}
