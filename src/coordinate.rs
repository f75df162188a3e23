//! Coordinates
//!
//! A coordinate addresses a single scalar in the outputs of another layer,
//! by layer index and element index. Coordinates are pure lookup keys, the
//! referenced layers are owned elsewhere.
use crate::data::FloatData;
use crate::errors::PathError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::ops::Index;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    layer_index: usize,
    element_index: usize,
}

impl Coordinate {
    pub fn new(layer_index: usize, element_index: usize) -> Self {
        Coordinate {
            layer_index,
            element_index,
        }
    }

    pub fn layer_index(&self) -> usize {
        self.layer_index
    }

    pub fn element_index(&self) -> usize {
        self.element_index
    }

    /// Read the referenced scalar.
    ///
    /// Panics if the layer or element is out of range.
    #[inline]
    pub fn get_value<T: FloatData<T>, L: AsRef<[T]>>(&self, inputs: &[L]) -> T {
        inputs[self.layer_index].as_ref()[self.element_index]
    }

    /// Read the referenced scalar, returning an error if it is out of range.
    pub fn try_get_value<T: FloatData<T>, L: AsRef<[T]>>(&self, inputs: &[L]) -> Result<T, PathError> {
        inputs
            .get(self.layer_index)
            .and_then(|layer| layer.as_ref().get(self.element_index))
            .copied()
            .ok_or(PathError::CoordinateOutOfBounds {
                layer: self.layer_index,
                element: self.element_index,
            })
    }
}

/// Ordered list of coordinates, one per consumer slot.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct CoordinateList {
    coordinates: Vec<Coordinate>,
}

impl CoordinateList {
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        CoordinateList { coordinates }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Coordinate> {
        self.coordinates.get(index)
    }

    /// Append a coordinate. Only meant for building a list before it is handed to a path.
    pub fn push(&mut self, coordinate: Coordinate) {
        self.coordinates.push(coordinate);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.coordinates.iter()
    }

    /// Lazy iterator over the coordinates at `start`, `start + stride`, ...
    ///
    /// A `stride` of zero is treated as one.
    pub fn get_iterator(&self, start: usize, stride: usize) -> CoordinateIterator<'_> {
        CoordinateIterator {
            coordinates: &self.coordinates,
            start,
            position: start,
            stride: stride.max(1),
        }
    }

    /// The minimum number of elements layer `layer_index` must have so that
    /// every coordinate referencing it is in bounds. Zero if no coordinate
    /// references the layer.
    pub fn get_required_layer_size(&self, layer_index: usize) -> usize {
        self.coordinates
            .iter()
            .filter(|c| c.layer_index == layer_index)
            .map(|c| c.element_index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Required size of every referenced layer, computed in a single pass.
    pub fn required_layer_sizes(&self) -> HashMap<usize, usize> {
        let mut sizes = HashMap::new();
        for c in &self.coordinates {
            let size = sizes.entry(c.layer_index).or_insert(0);
            if *size < c.element_index + 1 {
                *size = c.element_index + 1;
            }
        }
        sizes
    }
}

impl Index<usize> for CoordinateList {
    type Output = Coordinate;

    fn index(&self, index: usize) -> &Self::Output {
        &self.coordinates[index]
    }
}

impl From<Vec<Coordinate>> for CoordinateList {
    fn from(coordinates: Vec<Coordinate>) -> Self {
        CoordinateList::new(coordinates)
    }
}

impl FromIterator<Coordinate> for CoordinateList {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        CoordinateList::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CoordinateList {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.coordinates.iter()
    }
}

/// Forward iterator over a borrowed coordinate list.
///
/// Cloning yields an independent cursor, and `restart` rewinds to the
/// position the iterator was created with.
#[derive(Clone, Debug)]
pub struct CoordinateIterator<'a> {
    coordinates: &'a [Coordinate],
    start: usize,
    position: usize,
    stride: usize,
}

impl<'a> CoordinateIterator<'a> {
    pub fn restart(&mut self) {
        self.position = self.start;
    }

    /// True while there is a coordinate left to yield.
    pub fn is_valid(&self) -> bool {
        self.position < self.coordinates.len()
    }
}

impl<'a> Iterator for CoordinateIterator<'a> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.coordinates.get(self.position).copied()?;
        self.position += self.stride;
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.coordinates.len().saturating_sub(self.position);
        let n = remaining.div_ceil(self.stride);
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for CoordinateIterator<'a> {}
