//! Connectivity of a region through enumerated candidate-to-center paths

use super::{CandidateCells, Region};
use crate::error::SolveError;
use crate::grid::Cell;
use crate::model::{Constraint, LinearExpr, ModelBuilder, Relation, VarId, VariableRole};
use petgraph::algo::all_simple_paths;
use petgraph::graphmap::UnGraphMap;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathNode {
    Cell(Cell),
    /// All of the region's center cells collapsed into one node
    Center,
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathNode::Cell(cell) => write!(f, "{}", cell),
            PathNode::Center => write!(f, "center"),
        }
    }
}

/// Simple path from a candidate cell to the center node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectingPath {
    nodes: Vec<PathNode>,
}

impl ConnectingPath {
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Cells strictly between the source and the center
    pub fn intermediates(&self) -> Vec<Cell> {
        let inner = match self.nodes.len() {
            0..=2 => &[][..],
            n => &self.nodes[1..n - 1],
        };
        inner
            .iter()
            .filter_map(|node| match node {
                PathNode::Cell(cell) => Some(*cell),
                PathNode::Center => None,
            })
            .collect()
    }
}

impl fmt::Display for ConnectingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.nodes.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", parts.join(" - "))
    }
}

/// Adjacency between a region's candidate cells and its center
#[derive(Debug, Clone)]
pub struct CandidateGraph {
    graph: UnGraphMap<PathNode, ()>,
}

impl CandidateGraph {
    pub fn build(region: &Region, candidates: &CandidateCells) -> Self {
        let mut graph = UnGraphMap::with_capacity(candidates.len() + 1, candidates.len() * 2);
        graph.add_node(PathNode::Center);

        for cell in candidates.iter() {
            graph.add_node(PathNode::Cell(cell));
        }
        for cell in candidates.iter() {
            let below = Cell::new(cell.row + 1, cell.col);
            let right = Cell::new(cell.row, cell.col + 1);
            for neighbour in [below, right] {
                if candidates.contains(neighbour) {
                    graph.add_edge(PathNode::Cell(cell), PathNode::Cell(neighbour), ());
                }
            }
            if region.centers().iter().any(|center| center.is_orthogonally_adjacent(&cell)) {
                graph.add_edge(PathNode::Cell(cell), PathNode::Center, ());
            }
        }

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, node: PathNode) -> bool {
        self.graph.contains_node(node)
    }

    pub fn neighbors(&self, node: PathNode) -> impl Iterator<Item = PathNode> + '_ {
        self.graph.neighbors(node)
    }

    /// A path is kept when no node branches inside it: the source and the
    /// center have fewer than two graph neighbours on the path, every other
    /// node fewer than three.
    pub fn is_unbranched(&self, nodes: &[PathNode]) -> bool {
        let (Some(&source), Some(&target)) = (nodes.first(), nodes.last()) else {
            return false;
        };
        let on_path: HashSet<PathNode> = nodes.iter().copied().collect();

        nodes.iter().all(|&node| {
            let degree = self.neighbors(node).filter(|n| on_path.contains(n)).count();
            if node == source || node == target {
                degree < 2
            } else {
                degree < 3
            }
        })
    }
}

/// Every unbranched simple path from `source` to the center node
pub fn enumerate_valid_paths(graph: &CandidateGraph, source: Cell) -> Vec<ConnectingPath> {
    let from = PathNode::Cell(source);
    if !graph.contains(from) {
        return Vec::new();
    }

    all_simple_paths::<Vec<PathNode>, _>(&graph.graph, from, PathNode::Center, 0, None)
        .filter(|nodes| graph.is_unbranched(nodes))
        .map(|nodes| ConnectingPath { nodes })
        .collect()
}

/// What the connectivity constraints of one region amount to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub region: usize,
    pub candidates: usize,
    pub sources: usize,
    pub paths: usize,
    pub indicators: usize,
    /// Candidates with no connecting path, pinned out of the region
    pub forced_out: Vec<Cell>,
}

impl fmt::Display for ConnectivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "galaxy {}: {} candidates, {} sources, {} paths, {} forced out",
            self.region,
            self.candidates,
            self.sources,
            self.paths,
            self.forced_out.len()
        )
    }
}

/// Links each forward-half candidate's membership to at least one fully
/// included connecting path.
pub struct ConnectivityEngine<'a> {
    region: &'a Region,
    candidates: &'a CandidateCells,
}

impl<'a> ConnectivityEngine<'a> {
    pub fn new(region: &'a Region, candidates: &'a CandidateCells) -> Self {
        Self { region, candidates }
    }

    /// Path counts per forward-half source, without touching any model
    pub fn survey(&self) -> Vec<(Cell, usize)> {
        let graph = CandidateGraph::build(self.region, self.candidates);
        self.candidates
            .forward_half(self.region)
            .map(|source| (source, enumerate_valid_paths(&graph, source).len()))
            .collect()
    }

    pub fn contribute(&self, builder: &mut ModelBuilder) -> Result<ConnectivityReport, SolveError> {
        let region = self.region.index();
        let mut report = ConnectivityReport {
            region,
            candidates: self.candidates.len(),
            ..ConnectivityReport::default()
        };
        if self.candidates.is_empty() {
            return Ok(report);
        }

        let graph = CandidateGraph::build(self.region, self.candidates);
        debug!(
            region,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built candidate graph"
        );

        for source in self.candidates.forward_half(self.region) {
            report.sources += 1;
            let member = membership(builder, source, region)?;
            let paths = enumerate_valid_paths(&graph, source);

            if paths.is_empty() {
                debug!(region, cell = %source, "no connecting path, cell forced out");
                builder.add_constraint(Constraint::fix(member, false));
                report.forced_out.push(source);
                continue;
            }

            let mut any_path = LinearExpr::new().term(member, 1);
            for (index, path) in paths.iter().enumerate() {
                let indicator = builder.add_variable(VariableRole::PathIndicator {
                    region,
                    source,
                    path: index,
                })?;
                let inner = path
                    .intermediates()
                    .into_iter()
                    .map(|cell| membership(builder, cell, region))
                    .collect::<Result<Vec<VarId>, SolveError>>()?;
                let length = inner.len() as i64;

                // indicator only if every intermediate cell is a member
                if length > 0 {
                    builder.add_constraint(Constraint::new(
                        LinearExpr::sum(inner.iter().copied()).term(indicator, -length),
                        Relation::GreaterEq,
                        0,
                    ));
                }
                // all intermediates members leaves the indicator free to be 1
                builder.add_constraint(Constraint::new(
                    LinearExpr::sum(inner.iter().copied()).term(indicator, -1),
                    Relation::LessEq,
                    length - 1,
                ));
                any_path.add_term(indicator, -1);
            }
            builder.add_constraint(Constraint::new(any_path, Relation::LessEq, 0));

            report.paths += paths.len();
            report.indicators += paths.len();
        }

        debug!(
            region,
            sources = report.sources,
            paths = report.paths,
            forced_out = report.forced_out.len(),
            "added connectivity constraints"
        );
        Ok(report)
    }
}

fn membership(builder: &mut ModelBuilder, cell: Cell, region: usize) -> Result<VarId, SolveError> {
    builder.add_variable(VariableRole::Membership { cell, region })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridTopology;
    use crate::model::{Assignment, IlpBackend, SolveStatus, VariableManager};

    struct NeverCalled;

    impl IlpBackend for NeverCalled {
        fn name(&self) -> &'static str {
            "never"
        }

        fn solve(&mut self, _: &VariableManager, _: &[Constraint]) -> Result<SolveStatus, SolveError> {
            Ok(SolveStatus::Infeasible)
        }
    }

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().map(|&(r, c)| Cell::new(r, c)).collect()
    }

    /// Every assignment of the builder's variables that satisfies all constraints
    fn feasible_assignments(builder: &ModelBuilder) -> Vec<Assignment> {
        let n = builder.variable_count();
        assert!(n <= 16, "too many variables to enumerate: {}", n);
        (0u32..(1 << n))
            .map(|mask| Assignment::new((0..n).map(|i| mask & (1 << i) != 0).collect()))
            .filter(|a| builder.constraints().iter().all(|c| c.is_satisfied_by(|v| a.value(v))))
            .collect()
    }

    /// Center at (0, 0) with the candidates (0, 1), (0, 2), (0, 3) in a line
    fn line_fixture() -> (GridTopology, Region, CandidateCells) {
        let topology = GridTopology::new(1, 4).unwrap();
        let region = Region::new(0, &cells(&[(0, 0)]), &topology).unwrap();
        let candidates = CandidateCells::from_cells(cells(&[(0, 1), (0, 2), (0, 3)]));
        (topology, region, candidates)
    }

    #[test]
    fn test_graph_shape() {
        let (_, region, candidates) = line_fixture();
        let graph = CandidateGraph::build(&region, &candidates);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        let center: Vec<PathNode> = graph.neighbors(PathNode::Center).collect();
        assert_eq!(center, vec![PathNode::Cell(Cell::new(0, 1))]);
    }

    #[test]
    fn test_line_has_one_path_per_cell() {
        let (_, region, candidates) = line_fixture();
        let graph = CandidateGraph::build(&region, &candidates);
        for cell in candidates.iter() {
            let paths = enumerate_valid_paths(&graph, cell);
            assert_eq!(paths.len(), 1, "{}", cell);
            assert_eq!(paths[0].intermediates().len(), cell.col - 1);
        }
        let far = enumerate_valid_paths(&graph, Cell::new(0, 3));
        assert_eq!(far[0].intermediates(), cells(&[(0, 2), (0, 1)]));
    }

    #[test]
    fn test_membership_forces_whole_path() {
        let (topology, region, candidates) = line_fixture();
        let mut builder = ModelBuilder::new(topology, Box::new(NeverCalled));
        let report = ConnectivityEngine::new(&region, &candidates)
            .contribute(&mut builder)
            .unwrap();
        assert_eq!(report.sources, 3);
        assert_eq!(report.paths, 3);
        assert!(report.forced_out.is_empty());

        let x = |col: usize| {
            builder
                .lookup(&VariableRole::Membership { cell: Cell::new(0, col), region: 0 })
                .unwrap()
        };
        let indicator = |col: usize| {
            builder
                .lookup(&VariableRole::PathIndicator { region: 0, source: Cell::new(0, col), path: 0 })
                .unwrap()
        };

        let feasible = feasible_assignments(&builder);
        assert!(!feasible.is_empty());
        for a in feasible.iter().filter(|a| a.value(x(3))) {
            assert!(a.value(indicator(3)));
            assert!(a.value(x(2)));
            assert!(a.value(x(1)));
        }
        // a member with a gap before the center is impossible
        assert!(!feasible.iter().any(|a| a.value(x(2)) && !a.value(x(1))));
        // the full line is reachable
        assert!(feasible.iter().any(|a| a.value(x(1)) && a.value(x(2)) && a.value(x(3))));
    }

    #[test]
    fn test_branching_paths_rejected() {
        // center (0, 0) in a 2x2 grid; the detour through (1, 1) would put
        // both the center and the source next to two path nodes
        let topology = GridTopology::new(2, 2).unwrap();
        let region = Region::new(0, &cells(&[(0, 0)]), &topology).unwrap();
        let candidates = CandidateCells::from_cells(cells(&[(0, 1), (1, 0), (1, 1)]));
        let graph = CandidateGraph::build(&region, &candidates);

        let direct = enumerate_valid_paths(&graph, Cell::new(0, 1));
        assert_eq!(direct.len(), 1);
        assert!(direct[0].intermediates().is_empty());

        let diagonal = enumerate_valid_paths(&graph, Cell::new(1, 1));
        assert_eq!(diagonal.len(), 2);
        assert!(diagonal.iter().all(|p| p.intermediates().len() == 1));
    }

    #[test]
    fn test_unreachable_cell_forced_out() {
        let topology = GridTopology::new(1, 3).unwrap();
        let region = Region::new(0, &cells(&[(0, 0)]), &topology).unwrap();
        let candidates = CandidateCells::from_cells(cells(&[(0, 2)]));
        let mut builder = ModelBuilder::new(topology, Box::new(NeverCalled));

        let report = ConnectivityEngine::new(&region, &candidates)
            .contribute(&mut builder)
            .unwrap();
        assert_eq!(report.forced_out, cells(&[(0, 2)]));
        assert_eq!(report.indicators, 0);

        let member = builder
            .lookup(&VariableRole::Membership { cell: Cell::new(0, 2), region: 0 })
            .unwrap();
        assert_eq!(builder.constraints(), &[Constraint::fix(member, false)]);
    }

    #[test]
    fn test_survey_matches_contribution() {
        let (topology, region, candidates) = line_fixture();
        let engine = ConnectivityEngine::new(&region, &candidates);
        let survey = engine.survey();
        assert_eq!(survey.len(), 3);
        assert!(survey.iter().all(|&(_, count)| count == 1));

        let mut builder = ModelBuilder::new(topology, Box::new(NeverCalled));
        let report = engine.contribute(&mut builder).unwrap();
        assert_eq!(report.paths, survey.iter().map(|(_, n)| n).sum::<usize>());
    }
}
