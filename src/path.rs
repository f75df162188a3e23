//! Decision Tree Path
//!
//! Flat encoding of a binary decision tree's branching structure, and the
//! traversal that turns one set of input layers into a one-hot-per-level
//! vector over the edges taken from the root to a leaf.
//!
//! Interior node `i` owns the negative edge `2 * i` and the positive edge
//! `2 * i + 1`. The edge table maps every edge to the interior node it leads
//! to, with `0` standing for a leaf. Node 0 is the root, so no edge can lead
//! back to it.
use crate::config::ComputeConfig;
use crate::coordinate::{CoordinateIterator, CoordinateList};
use crate::data::FloatData;
use crate::errors::PathError;
use log::warn;
use rayon::prelude::*;

/// Where an edge leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Child {
    Leaf,
    Node(usize),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecisionTreePath {
    pub(crate) edge_to_interior_node: Vec<usize>,
    pub(crate) split_rule_coordinates: CoordinateList,
}

impl DecisionTreePath {
    /// Create a path from its two tables. No validation is done here,
    /// see [`DecisionTreePath::validate`].
    ///
    /// * `edge_to_interior_node` - Interior node reached by each edge, `0` for a leaf.
    /// * `split_rule_coordinates` - Input scalar tested by each interior node.
    pub fn new(edge_to_interior_node: Vec<usize>, split_rule_coordinates: CoordinateList) -> Self {
        DecisionTreePath {
            edge_to_interior_node,
            split_rule_coordinates,
        }
    }

    pub fn num_interior_nodes(&self) -> usize {
        self.split_rule_coordinates.len()
    }

    pub fn num_edges(&self) -> usize {
        2 * self.num_interior_nodes()
    }

    /// Length of the output buffer `compute` writes to.
    pub fn output_size(&self) -> usize {
        self.num_edges()
    }

    pub fn edge_to_interior_node(&self) -> &[usize] {
        &self.edge_to_interior_node
    }

    pub fn split_rule_coordinates(&self) -> &CoordinateList {
        &self.split_rule_coordinates
    }

    #[inline]
    pub fn get_negative_outgoing_edge_index(&self, interior_node_index: usize) -> usize {
        interior_node_index * 2
    }

    #[inline]
    pub fn get_positive_outgoing_edge_index(&self, interior_node_index: usize) -> usize {
        interior_node_index * 2 + 1
    }

    /// Interior node reached through `incoming_edge_index`. Returns `0` for a leaf.
    ///
    /// Panics if the edge is out of range.
    #[inline]
    pub fn get_interior_node_index(&self, incoming_edge_index: usize) -> usize {
        self.edge_to_interior_node[incoming_edge_index]
    }

    /// Same lookup as `get_interior_node_index`, with the leaf sentinel made explicit.
    pub fn child(&self, incoming_edge_index: usize) -> Child {
        match self.get_interior_node_index(incoming_edge_index) {
            0 => Child::Leaf,
            n => Child::Node(n),
        }
    }

    /// Walk from the root to a leaf, calling `visit` with every edge taken.
    ///
    /// A value `<= 0` takes the negative edge, anything else (NaN included)
    /// takes the positive one.
    #[inline]
    fn walk<T, L, F>(&self, inputs: &[L], mut visit: F)
    where
        T: FloatData<T>,
        L: AsRef<[T]>,
        F: FnMut(usize),
    {
        if self.num_interior_nodes() == 0 {
            return;
        }

        let mut node = 0;
        loop {
            let value = self.split_rule_coordinates[node].get_value(inputs);
            let edge = if value <= T::ZERO {
                self.get_negative_outgoing_edge_index(node)
            } else {
                self.get_positive_outgoing_edge_index(node)
            };
            visit(edge);
            node = self.get_interior_node_index(edge);
            if node == 0 {
                break;
            }
        }
    }

    /// Mark every edge on the path taken by `inputs` with one.
    ///
    /// `outputs` must hold `num_edges()` values and should be zeroed, entries
    /// off the path are left untouched. Panics on out-of-range indices; use
    /// `try_compute` for inputs that have not been validated.
    pub fn compute<T, L>(&self, inputs: &[L], outputs: &mut [T])
    where
        T: FloatData<T>,
        L: AsRef<[T]>,
    {
        self.walk(inputs, |edge| outputs[edge] = T::ONE);
    }

    /// The edges taken by `inputs`, from the root down.
    pub fn compute_path<T, L>(&self, inputs: &[L]) -> Vec<usize>
    where
        T: FloatData<T>,
        L: AsRef<[T]>,
    {
        let mut edges = Vec::new();
        self.walk(inputs, |edge| edges.push(edge));
        edges
    }

    /// Bounds checked version of `compute`.
    ///
    /// Fails instead of panicking if the output buffer has the wrong length,
    /// a coordinate or child lookup is out of range, or the walk visits more
    /// nodes than the tree has. Edges visited before the failure stay marked.
    pub fn try_compute<T, L>(&self, inputs: &[L], outputs: &mut [T]) -> Result<(), PathError>
    where
        T: FloatData<T>,
        L: AsRef<[T]>,
    {
        let n_nodes = self.num_interior_nodes();
        if outputs.len() != self.num_edges() {
            return Err(PathError::OutputSizeMismatch {
                expected: self.num_edges(),
                actual: outputs.len(),
            });
        }
        if n_nodes == 0 {
            return Ok(());
        }

        let mut node = 0;
        let mut steps = 0;
        loop {
            let coordinate = self
                .split_rule_coordinates
                .get(node)
                .ok_or_else(|| PathError::InvalidStructure(format!("interior node {} has no split rule", node)))?;
            let value = coordinate.try_get_value(inputs)?;
            let edge = if value <= T::ZERO {
                self.get_negative_outgoing_edge_index(node)
            } else {
                self.get_positive_outgoing_edge_index(node)
            };
            let slot = outputs
                .get_mut(edge)
                .ok_or_else(|| PathError::InvalidStructure(format!("edge {} is out of range", edge)))?;
            *slot = T::ONE;

            node = *self
                .edge_to_interior_node
                .get(edge)
                .ok_or_else(|| PathError::InvalidStructure(format!("edge {} has no entry in the edge table", edge)))?;
            if node == 0 {
                return Ok(());
            }
            steps += 1;
            if steps >= n_nodes {
                return Err(PathError::InvalidStructure(format!(
                    "traversal did not reach a leaf after visiting {} nodes",
                    steps
                )));
            }
        }
    }

    /// Evaluate many independent input sets.
    ///
    /// Returns a flat buffer of `rows.len() * num_edges()` values, where the
    /// chunk for row `r` starts at `r * num_edges()`.
    ///
    /// * `rows` - One set of input layers per row.
    /// * `config` - Whether to run in parallel, and whether to bounds check.
    pub fn compute_batch<L, R>(&self, rows: &[R], config: &ComputeConfig) -> Result<Vec<f64>, PathError>
    where
        L: AsRef<[f64]> + Sync,
        R: AsRef<[L]> + Sync,
    {
        let n_edges = self.num_edges();
        let mut outputs = vec![0.0; rows.len() * n_edges];
        if n_edges == 0 {
            return Ok(outputs);
        }

        match (config.parallel, config.check_bounds) {
            (true, true) => outputs
                .par_chunks_mut(n_edges)
                .zip(rows.par_iter())
                .try_for_each(|(out, row)| self.try_compute(row.as_ref(), out))?,
            (true, false) => outputs
                .par_chunks_mut(n_edges)
                .zip(rows.par_iter())
                .for_each(|(out, row)| self.compute(row.as_ref(), out)),
            (false, true) => outputs
                .chunks_mut(n_edges)
                .zip(rows.iter())
                .try_for_each(|(out, row)| self.try_compute(row.as_ref(), out))?,
            (false, false) => outputs
                .chunks_mut(n_edges)
                .zip(rows.iter())
                .for_each(|(out, row)| self.compute(row.as_ref(), out)),
        }
        Ok(outputs)
    }

    /// Lazy iterator over the split rule coordinates, starting at `index`.
    pub fn get_input_coordinate_iterator(&self, index: usize) -> CoordinateIterator<'_> {
        self.split_rule_coordinates.get_iterator(index, 1)
    }

    /// Minimum size of input layer `layer_index` for every split rule to be in bounds.
    pub fn get_required_layer_size(&self, layer_index: usize) -> usize {
        self.split_rule_coordinates.get_required_layer_size(layer_index)
    }

    /// Check that the tables describe a tree rooted at node 0.
    ///
    /// The edge table must hold two entries per interior node, every child
    /// must be an existing interior node, and no node may be reachable from
    /// the root more than once.
    pub fn validate(&self) -> Result<(), PathError> {
        let n_nodes = self.num_interior_nodes();
        if self.edge_to_interior_node.len() != 2 * n_nodes {
            return Err(invalid_structure(format!(
                "edge table has {} entries, expected {} for {} interior nodes",
                self.edge_to_interior_node.len(),
                2 * n_nodes,
                n_nodes
            )));
        }
        if let Some((edge, node)) = self
            .edge_to_interior_node
            .iter()
            .enumerate()
            .find(|(_, &node)| node >= n_nodes && node != 0)
        {
            return Err(invalid_structure(format!(
                "edge {} leads to node {}, but there are only {} interior nodes",
                edge, node, n_nodes
            )));
        }
        if n_nodes == 0 {
            return Ok(());
        }

        let mut seen = vec![false; n_nodes];
        seen[0] = true;
        let mut stack = vec![0];
        while let Some(node) = stack.pop() {
            for edge in [
                self.get_negative_outgoing_edge_index(node),
                self.get_positive_outgoing_edge_index(node),
            ] {
                if let Child::Node(child) = self.child(edge) {
                    if seen[child] {
                        return Err(invalid_structure(format!(
                            "node {} is reached more than once (again through edge {})",
                            child, edge
                        )));
                    }
                    seen[child] = true;
                    stack.push(child);
                }
            }
        }
        Ok(())
    }

    /// Check that `inputs` provides every layer the split rules read from,
    /// each with at least the required number of elements.
    pub fn validate_inputs<T, L>(&self, inputs: &[L]) -> Result<(), PathError>
    where
        T: FloatData<T>,
        L: AsRef<[T]>,
    {
        let mut sizes: Vec<(usize, usize)> = self.split_rule_coordinates.required_layer_sizes().into_iter().collect();
        sizes.sort_unstable();
        for (layer, required) in sizes {
            let actual = match inputs.get(layer) {
                Some(l) => l.as_ref().len(),
                None => {
                    warn!("Input layer {} is missing.", layer);
                    return Err(PathError::MissingLayer(layer));
                }
            };
            if actual < required {
                warn!("Input layer {} has {} elements, {} required.", layer, actual, required);
                return Err(PathError::LayerTooSmall {
                    layer,
                    required,
                    actual,
                });
            }
        }
        Ok(())
    }
}

fn invalid_structure(msg: String) -> PathError {
    warn!("Rejecting decision tree path: {}", msg);
    PathError::InvalidStructure(msg)
}
