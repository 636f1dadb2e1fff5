//! Loop-drawing puzzle rules

use super::contributor::ConstraintContributor;
use super::definition::{Clue, SlitherlinkDefinition};
use crate::error::SolveError;
use crate::grid::Edge;
use crate::model::{Constraint, LinearExpr, ModelBuilder, Relation, VarId, VariableRole};

/// Declares every edge and corner-point variable, edges first
pub struct LoopVariables;

impl ConstraintContributor for LoopVariables {
    fn name(&self) -> &'static str {
        "loop variables"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let topology = *builder.topology();
        for edge in topology.edges() {
            builder.add_variable(VariableRole::Edge(edge))?;
        }
        for corner in topology.corners() {
            builder.add_variable(VariableRole::Point(corner))?;
        }
        Ok(())
    }
}

/// Every corner touches 0 or 2 active edges: `sum(edges) - 2 * point == 0`
pub struct CornerParity;

impl ConstraintContributor for CornerParity {
    fn name(&self) -> &'static str {
        "corner parity"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let topology = *builder.topology();
        for corner in topology.corners() {
            let point = builder.add_variable(VariableRole::Point(corner))?;
            let edges = edge_variables(builder, topology.corner_edges(corner))?;
            let expr = LinearExpr::sum(edges).term(point, -2);
            builder.add_constraint(Constraint::new(expr, Relation::Equal, 0));
        }
        Ok(())
    }
}

/// Each clue equals the number of active edges around its cell
pub struct ClueCount {
    clues: Vec<Clue>,
}

impl ClueCount {
    pub fn new(clues: Vec<Clue>) -> Self {
        Self { clues }
    }
}

impl ConstraintContributor for ClueCount {
    fn name(&self) -> &'static str {
        "clue counts"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let topology = *builder.topology();
        for clue in &self.clues {
            let edges = edge_variables(builder, topology.cell_edges(clue.cell()))?;
            builder.add_constraint(Constraint::exactly(edges, i64::from(clue.val)));
        }
        Ok(())
    }
}

/// At least one edge is drawn
pub struct NonEmptyLoop;

impl ConstraintContributor for NonEmptyLoop {
    fn name(&self) -> &'static str {
        "non-empty loop"
    }

    fn contribute(&self, builder: &mut ModelBuilder) -> Result<(), SolveError> {
        let topology = *builder.topology();
        let edges = edge_variables(builder, topology.edges())?;
        builder.add_constraint(Constraint::at_least(edges, 1));
        Ok(())
    }
}

/// Contributors for a loop puzzle, in application order
pub fn contributors(definition: &SlitherlinkDefinition) -> Vec<Box<dyn ConstraintContributor>> {
    vec![
        Box::new(LoopVariables),
        Box::new(CornerParity),
        Box::new(ClueCount::new(definition.clues.clone())),
        Box::new(NonEmptyLoop),
    ]
}

fn edge_variables<I>(builder: &mut ModelBuilder, edges: I) -> Result<Vec<VarId>, SolveError>
where
    I: IntoIterator<Item = Edge>,
{
    edges
        .into_iter()
        .map(|edge| builder.add_variable(VariableRole::Edge(edge)))
        .collect()
}
