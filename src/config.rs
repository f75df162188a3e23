//! Configuration
//!
//! Options controlling how a path is evaluated over a batch of inputs.
use serde::{Deserialize, Serialize};

/// Batch evaluation options.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ComputeConfig {
    /// Evaluate rows in parallel using Rayon.
    pub parallel: bool,
    /// Route each row through the bounds checked traversal.
    pub check_bounds: bool,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        ComputeConfig {
            parallel: true,
            check_bounds: false,
        }
    }
}

impl ComputeConfig {
    pub fn set_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn set_check_bounds(mut self, check_bounds: bool) -> Self {
        self.check_bounds = check_bounds;
        self
    }
}
