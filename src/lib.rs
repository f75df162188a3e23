//! Decision tree path encoding.
//!
//! A [`DecisionTreePath`] stores the branching structure of a binary decision
//! tree in two flat tables and evaluates one set of input layers into a
//! sparse vector marking the edges taken from the root to a leaf.

// Modules
pub mod config;
pub mod coordinate;
pub mod data;
pub mod errors;
pub mod io;
pub mod path;

// Individual classes, and functions
pub use config::ComputeConfig;
pub use coordinate::{Coordinate, CoordinateIterator, CoordinateList};
pub use errors::PathError;
pub use io::PathIO;
pub use path::{Child, DecisionTreePath};
