//! Region puzzles: center validation, candidate pruning and connectivity

pub mod region;
pub mod candidates;
pub mod paths;

pub use region::{Centroid, Region};
pub use candidates::{prune_all, prune_candidates, CandidateCells};
pub use paths::{
    enumerate_valid_paths, CandidateGraph, ConnectingPath, ConnectivityEngine, ConnectivityReport, PathNode,
};
