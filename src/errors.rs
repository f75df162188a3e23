//! Errors
//!
//! Custom error types used throughout the `treepath` crate.
use thiserror::Error;

/// Errors that can occur while loading, validating or evaluating a decision tree path.
#[derive(Debug, Error)]
pub enum PathError {
    /// Serialized path carries a version tag this crate cannot read.
    #[error("Unsupported decision tree path version: {0}")]
    UnsupportedVersion(String),
    /// Unable to write path to file.
    #[error("Unable to write path to file: {0}")]
    UnableToWrite(String),
    /// Unable to read path from file.
    #[error("Unable to read path from a file {0}")]
    UnableToRead(String),
    /// The edge table and the coordinate list do not describe a tree rooted at node 0.
    #[error("Invalid decision tree path structure: {0}")]
    InvalidStructure(String),
    /// A split rule references a layer that is not present in the inputs.
    #[error("Input layer {0} is referenced by a split rule, but was not provided.")]
    MissingLayer(usize),
    /// First value is the layer, second is the size the split rules need, third is what was passed.
    #[error("Input layer {layer} must have at least {required} elements, but {actual} provided.")]
    LayerTooSmall {
        layer: usize,
        required: usize,
        actual: usize,
    },
    /// Coordinate points outside of the provided inputs.
    #[error("Coordinate (layer {layer}, element {element}) is out of bounds.")]
    CoordinateOutOfBounds { layer: usize, element: usize },
    /// Output buffer length differs from the number of edges.
    #[error("Output buffer must have {expected} elements, but {actual} provided.")]
    OutputSizeMismatch { expected: usize, actual: usize },
}
