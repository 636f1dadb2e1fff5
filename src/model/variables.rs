//! Decision-variable registry

use crate::error::SolveError;
use crate::grid::{Cell, Corner, Edge, GridTopology, Orientation};
use std::collections::HashMap;
use std::fmt;

/// Stable identity of a boolean decision variable within one model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a variable stands for, and at which grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableRole {
    /// Edge is part of the drawn loop
    Edge(Edge),
    /// Corner point is visited by the loop
    Point(Corner),
    /// Cell belongs to the given region
    Membership { cell: Cell, region: usize },
    /// The `path`-th connecting path from `source` to its region's center is fully included
    PathIndicator { region: usize, source: Cell, path: usize },
}

impl fmt::Display for VariableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableRole::Edge(edge) => match edge.orientation {
                Orientation::Horizontal => write!(f, "h_{}_{}", edge.row, edge.col),
                Orientation::Vertical => write!(f, "v_{}_{}", edge.row, edge.col),
            },
            VariableRole::Point(corner) => write!(f, "p_{}_{}", corner.row, corner.col),
            VariableRole::Membership { cell, region } => write!(f, "x_{}_{}_{}", cell.row, cell.col, region),
            VariableRole::PathIndicator { region, source, path } => {
                write!(f, "path_{}_{}_{}_{}", region, source.row, source.col, path)
            }
        }
    }
}

/// Maps roles to variable ids; each role gets exactly one variable
#[derive(Debug, Clone)]
pub struct VariableManager {
    variable_map: HashMap<VariableRole, VarId>,
    roles: Vec<VariableRole>,
    topology: GridTopology,
}

impl VariableManager {
    pub fn new(topology: GridTopology) -> Self {
        Self {
            variable_map: HashMap::new(),
            roles: Vec::new(),
            topology,
        }
    }

    /// Get or create the variable for `role`
    pub fn get_variable(&mut self, role: VariableRole) -> Result<VarId, SolveError> {
        if let Some(&id) = self.variable_map.get(&role) {
            return Ok(id);
        }

        self.validate_role(&role)?;

        let id = VarId(self.roles.len());
        self.roles.push(role);
        self.variable_map.insert(role, id);
        Ok(id)
    }

    /// Look up an existing variable without creating one
    pub fn lookup(&self, role: &VariableRole) -> Option<VarId> {
        self.variable_map.get(role).copied()
    }

    pub fn role(&self, id: VarId) -> Option<&VariableRole> {
        self.roles.get(id.0)
    }

    pub fn variable_count(&self) -> usize {
        self.roles.len()
    }

    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// All variables in creation order
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &VariableRole)> {
        self.roles.iter().enumerate().map(|(i, role)| (VarId(i), role))
    }

    fn validate_role(&self, role: &VariableRole) -> Result<(), SolveError> {
        let in_bounds = match role {
            VariableRole::Edge(edge) => self.topology.contains_edge(edge),
            VariableRole::Point(corner) => self.topology.contains_corner(*corner),
            VariableRole::Membership { cell, .. } => self.topology.contains(*cell),
            VariableRole::PathIndicator { source, .. } => self.topology.contains(*source),
        };
        if in_bounds {
            Ok(())
        } else {
            Err(SolveError::VariableOutOfBounds {
                role: *role,
                rows: self.topology.rows,
                cols: self.topology.cols,
            })
        }
    }

    pub fn statistics(&self) -> VariableStatistics {
        let mut stats = VariableStatistics {
            total_variables: self.variable_count(),
            ..VariableStatistics::default()
        };

        for role in &self.roles {
            match role {
                VariableRole::Edge(_) => stats.edge_variables += 1,
                VariableRole::Point(_) => stats.point_variables += 1,
                VariableRole::Membership { .. } => stats.membership_variables += 1,
                VariableRole::PathIndicator { .. } => stats.indicator_variables += 1,
            }
        }

        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub edge_variables: usize,
    pub point_variables: usize,
    pub membership_variables: usize,
    pub indicator_variables: usize,
}

impl fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Edge variables: {}", self.edge_variables)?;
        writeln!(f, "  Point variables: {}", self.point_variables)?;
        writeln!(f, "  Membership variables: {}", self.membership_variables)?;
        writeln!(f, "  Path indicators: {}", self.indicator_variables)?;
        Ok(())
    }
}
