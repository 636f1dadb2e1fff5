//! Splitting a set of active edges into connected walks

use crate::grid::{Corner, Edge};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// An ordered walk of edges where consecutive edges share a corner point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    edges: Vec<Edge>,
}

impl Cycle {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edge set without walk order, for order-insensitive comparison
    pub fn edge_set(&self) -> BTreeSet<Edge> {
        self.edges.iter().copied().collect()
    }

    /// The walk returns to where it started
    pub fn is_closed(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) if self.edges.len() >= 3 => first.is_adjacent(last),
            _ => false,
        }
    }

    /// Closed, and every corner it touches is touched by exactly two of its edges
    pub fn is_simple_cycle(&self) -> bool {
        self.is_closed() && self.corner_degrees().values().all(|&degree| degree == 2)
    }

    pub fn corner_degrees(&self) -> HashMap<Corner, usize> {
        let mut degrees = HashMap::new();
        for edge in &self.edges {
            for corner in edge.corners() {
                *degrees.entry(corner).or_insert(0) += 1;
            }
        }
        degrees
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.edges.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", parts.join(" -> "))
    }
}

/// Partition `active` into walks.
///
/// Each walk starts from the first unvisited edge and is extended from its
/// last edge by any unvisited edge sharing a corner, until none is left.
/// Under the per-corner degree 0/2 rule every walk is a closed cycle, and a
/// single returned walk covering all edges means one global loop.
pub fn decompose_cycles(active: &[Edge]) -> Vec<Cycle> {
    let mut remaining: Vec<Edge> = active.to_vec();
    let mut cycles = Vec::new();

    while !remaining.is_empty() {
        let mut walk = vec![remaining.remove(0)];

        loop {
            let Some(last) = walk.last() else { break };
            match remaining.iter().position(|edge| edge.is_adjacent(last)) {
                Some(index) => walk.push(remaining.remove(index)),
                None => break,
            }
        }

        cycles.push(Cycle::new(walk));
    }

    cycles
}
