//! Boolean integer-program model and its solver boundary

pub mod variables;
pub mod constraints;
pub mod backend;
pub mod builder;

pub use variables::{VarId, VariableManager, VariableRole, VariableStatistics};
pub use constraints::{Constraint, LinearExpr, Relation};
pub use backend::{create_backend, Assignment, IlpBackend, MicroLpBackend, SolveStatus};
pub use builder::{ModelBuilder, ModelStatistics};
