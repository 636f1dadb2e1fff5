//! Loop structure: cycle decomposition and the lazy cut loop

pub mod decompose;
pub mod subtour;

pub use decompose::{decompose_cycles, Cycle};
pub use subtour::{active_edges, subtour_cut, LoopOutcome, LoopState, SubtourEliminator};
