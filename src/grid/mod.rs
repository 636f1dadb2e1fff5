//! Grid addressing and puzzle file handling

pub mod topology;
pub mod io;

pub use topology::{Cell, Corner, Edge, GridTopology, Orientation};
pub use io::{create_example_puzzles, example_puzzles, load_puzzle_from_file, load_puzzles_from_directory, save_puzzle_to_file};
